use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::convert::TryInto;

use crate::{raffle_error::RaffleError, raffle_state::VrfConfig};

pub const RAFFLE_SEED: &[u8] = b"raffle";

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Create the raffle account and open the first round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The creator, pays for the raffle account
    /// 1. `[writable]` The raffle account (PDA of `["raffle", creator]`)
    /// 2. `[]` The VRF coordinator allowed to deliver randomness
    /// 3. `[]` The system program
    InitializeRaffle {
        /// Minimum payment per entry in lamports
        entrance_fee: u64,
        /// Seconds between rounds
        interval: u64,
        vrf: VrfConfig,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The entrant, pays the entry and the slot rent
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Lamports paid into the pool, at least the entrance fee
        amount: u64,
    },

    /// Evaluate the upkeep predicate. Read-only.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep { check_data: Vec<u8> },

    /// Close entry and request randomness
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any caller (automation agent)
    /// 1. `[writable]` The raffle account
    PerformUpkeep { perform_data: Vec<u8> },

    /// Deliver randomness for the pending request
    ///
    /// Accounts expected:
    /// 0. `[signer]` The VRF coordinator
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The winner, `entrants[random_words[0] % entrant_count]`
    FulfillRandomWords {
        request_id: [u8; 32],
        random_words: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(RaffleError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_u64(rest)?;
                let (key_hash, rest) = Self::unpack_fixed_bytes::<32>(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (request_confirmations, rest) = Self::unpack_u16(rest)?;
                let (callback_gas_limit, rest) = Self::unpack_u32(rest)?;
                let (num_words, _) = Self::unpack_u32(rest)?;
                Self::InitializeRaffle {
                    entrance_fee,
                    interval,
                    vrf: VrfConfig {
                        key_hash,
                        subscription_id,
                        request_confirmations,
                        callback_gas_limit,
                        num_words,
                    },
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            2 => {
                let (check_data, _) = Self::unpack_bytes(rest)?;
                Self::CheckUpkeep { check_data }
            }
            3 => {
                let (perform_data, _) = Self::unpack_bytes(rest)?;
                Self::PerformUpkeep { perform_data }
            }
            4 => {
                let (request_id, rest) = Self::unpack_fixed_bytes::<32>(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                let mut random_words = Vec::with_capacity(count.min(64) as usize);
                for _ in 0..count {
                    let (word, next) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = next;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(RaffleError::InvalidInstructionData.into()),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::InitializeRaffle {
                entrance_fee,
                interval,
                vrf,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(&vrf.key_hash);
                buf.extend_from_slice(&vrf.subscription_id.to_le_bytes());
                buf.extend_from_slice(&vrf.request_confirmations.to_le_bytes());
                buf.extend_from_slice(&vrf.callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&vrf.num_words.to_le_bytes());
            }
            Self::EnterRaffle { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep { check_data } => {
                buf.push(2);
                Self::pack_bytes(&mut buf, check_data);
            }
            Self::PerformUpkeep { perform_data } => {
                buf.push(3);
                Self::pack_bytes(&mut buf, perform_data);
            }
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(4);
                buf.extend_from_slice(request_id);
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_fixed_bytes<const N: usize>(input: &[u8]) -> Result<([u8; N], &[u8]), ProgramError> {
        if input.len() < N {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let (bytes, rest) = input.split_at(N);
        let bytes: [u8; N] = bytes
            .try_into()
            .map_err(|_| RaffleError::InvalidInstructionData)?;
        Ok((bytes, rest))
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((u64::from_le_bytes(bytes), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<4>(input)?;
        Ok((u32::from_le_bytes(bytes), rest))
    }

    fn unpack_u16(input: &[u8]) -> Result<(u16, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<2>(input)?;
        Ok((u16::from_le_bytes(bytes), rest))
    }

    fn unpack_bytes(input: &[u8]) -> Result<(Vec<u8>, &[u8]), ProgramError> {
        let (len, rest) = Self::unpack_u32(input)?;
        let len = len as usize;
        if rest.len() < len {
            return Err(RaffleError::InvalidInstructionData.into());
        }
        let (bytes, rest) = rest.split_at(len);
        Ok((bytes.to_vec(), rest))
    }

    fn pack_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(bytes);
    }
}

/// Address of the raffle account owned by `creator`
pub fn find_raffle_address(program_id: &Pubkey, creator: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RAFFLE_SEED, creator.as_ref()], program_id)
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    creator: &Pubkey,
    coordinator: &Pubkey,
    entrance_fee: u64,
    interval: u64,
    vrf: VrfConfig,
) -> Instruction {
    let (raffle_account, _) = find_raffle_address(program_id, creator);
    let data = RaffleInstruction::InitializeRaffle {
        entrance_fee,
        interval,
        vrf,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(raffle_account, false),
            AccountMeta::new_readonly(*coordinator, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Create enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    entrant: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*entrant, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: RaffleInstruction::EnterRaffle { amount }.pack(),
    }
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, raffle_account: &Pubkey, check_data: Vec<u8>) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*raffle_account, false)],
        data: RaffleInstruction::CheckUpkeep { check_data }.pack(),
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle_account: &Pubkey,
    perform_data: Vec<u8>,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(*raffle_account, false),
        ],
        data: RaffleInstruction::PerformUpkeep { perform_data }.pack(),
    }
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    coordinator: &Pubkey,
    raffle_account: &Pubkey,
    recipient: &Pubkey,
    request_id: [u8; 32],
    random_words: Vec<u64>,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*coordinator, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new(*recipient, false),
        ],
        data: RaffleInstruction::FulfillRandomWords {
            request_id,
            random_words,
        }
        .pack(),
    }
}
