use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    clock::UnixTimestamp,
    hash::Hash,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};
use std::convert::TryFrom;

use crate::raffle_error::RaffleError;

/// Correlation id handed to the coordinator and echoed back on fulfillment.
pub type RequestId = Hash;

/// State of the current round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Randomness requested, waiting for the coordinator
    Calculating,
}

impl TryFrom<u8> for RaffleState {
    type Error = &'static str;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleState::Open),
            1 => Ok(RaffleState::Calculating),
            _ => Err("Invalid raffle state"),
        }
    }
}

impl From<RaffleState> for u8 {
    fn from(state: RaffleState) -> Self {
        match state {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }
}

/// Parameters forwarded to the VRF coordinator with every request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VrfConfig {
    /// Gas lane / key hash the coordinator proves against
    pub key_hash: [u8; 32],
    /// Subscription billed for the request
    pub subscription_id: u64,
    /// Confirmations the coordinator waits before answering
    pub request_confirmations: u16,
    /// Compute budget for the fulfillment callback
    pub callback_gas_limit: u32,
    /// Number of random words per request
    pub num_words: u32,
}

/// Immutable configuration written at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// The only key allowed to deliver randomness
    pub coordinator: Pubkey,
    /// Minimum payment per entry in lamports
    pub entrance_fee: u64,
    /// Seconds a round stays open before upkeep may close it
    pub interval: u64,
    pub vrf: VrfConfig,
}

impl RaffleConfig {
    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.entrance_fee == 0 || self.interval == 0 || self.vrf.num_words == 0 {
            return Err(RaffleError::InvalidConfig);
        }
        Ok(())
    }
}

/// Raffle account header. Entrants follow the header, see `ledger`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Bump of the raffle PDA
    pub bump: u8,
    /// Creator, part of the PDA seeds
    pub creator: Pubkey,
    pub config: RaffleConfig,
    /// State of the current round
    pub state: RaffleState,
    /// Sum of entry payments in the current round, rent excluded
    pub pooled_balance: u64,
    /// When the previous round closed (or the raffle was created)
    pub last_timestamp: UnixTimestamp,
    /// Outstanding randomness request, present only while calculating
    pub pending_request: Option<RequestId>,
    /// Number of requests issued so far
    pub request_nonce: u64,
    /// Winner of the most recently completed round
    pub recent_winner: Option<Pubkey>,
    /// Number of entrants stored after the header
    pub entrant_count: u64,
}

impl Raffle {
    pub fn new(creator: Pubkey, bump: u8, config: RaffleConfig, now: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            bump,
            creator,
            config,
            state: RaffleState::Open,
            pooled_balance: 0,
            last_timestamp: now,
            pending_request: None,
            request_nonce: 0,
            recent_winner: None,
            entrant_count: 0,
        }
    }

    /// Starts a fresh round in place after a payout.
    pub fn reset_round(&mut self, winner: Pubkey, now: UnixTimestamp) {
        self.recent_winner = Some(winner);
        self.entrant_count = 0;
        self.pooled_balance = 0;
        self.last_timestamp = now;
        self.pending_request = None;
        self.state = RaffleState::Open;
    }
}

impl Sealed for Raffle {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

fn unpack_option_key(flag: &[u8; 1], bytes: &[u8; 32]) -> Result<Option<[u8; 32]>, ProgramError> {
    match flag[0] {
        0 => Ok(None),
        1 => Ok(Some(*bytes)),
        _ => Err(ProgramError::InvalidAccountData),
    }
}

fn pack_option_key(value: Option<[u8; 32]>, flag: &mut [u8; 1], bytes: &mut [u8; 32]) {
    match value {
        Some(key) => {
            flag[0] = 1;
            *bytes = key;
        }
        None => {
            flag[0] = 0;
            *bytes = [0u8; 32];
        }
    }
}

impl Pack for Raffle {
    const LEN: usize = 1 + 1 + 32 + 32 + 8 + 8 + 32 + 8 + 2 + 4 + 4 + 1 + 8 + 8 + 1 + 32 + 8 + 1 + 32 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Raffle::LEN];
        let (
            is_initialized,
            bump,
            creator,
            coordinator,
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
            request_confirmations,
            callback_gas_limit,
            num_words,
            state,
            pooled_balance,
            last_timestamp,
            has_pending_request,
            pending_request,
            request_nonce,
            has_recent_winner,
            recent_winner,
            entrant_count,
        ) = array_refs![src, 1, 1, 32, 32, 8, 8, 32, 8, 2, 4, 4, 1, 8, 8, 1, 32, 8, 1, 32, 8];

        let state = RaffleState::try_from(state[0]).map_err(|_| ProgramError::InvalidAccountData)?;

        Ok(Raffle {
            is_initialized: is_initialized[0] != 0,
            bump: bump[0],
            creator: Pubkey::new_from_array(*creator),
            config: RaffleConfig {
                coordinator: Pubkey::new_from_array(*coordinator),
                entrance_fee: u64::from_le_bytes(*entrance_fee),
                interval: u64::from_le_bytes(*interval),
                vrf: VrfConfig {
                    key_hash: *key_hash,
                    subscription_id: u64::from_le_bytes(*subscription_id),
                    request_confirmations: u16::from_le_bytes(*request_confirmations),
                    callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
                    num_words: u32::from_le_bytes(*num_words),
                },
            },
            state,
            pooled_balance: u64::from_le_bytes(*pooled_balance),
            last_timestamp: UnixTimestamp::from_le_bytes(*last_timestamp),
            pending_request: unpack_option_key(has_pending_request, pending_request)?
                .map(Hash::new_from_array),
            request_nonce: u64::from_le_bytes(*request_nonce),
            recent_winner: unpack_option_key(has_recent_winner, recent_winner)?
                .map(Pubkey::new_from_array),
            entrant_count: u64::from_le_bytes(*entrant_count),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Raffle::LEN];
        let (
            is_initialized_dst,
            bump_dst,
            creator_dst,
            coordinator_dst,
            entrance_fee_dst,
            interval_dst,
            key_hash_dst,
            subscription_id_dst,
            request_confirmations_dst,
            callback_gas_limit_dst,
            num_words_dst,
            state_dst,
            pooled_balance_dst,
            last_timestamp_dst,
            has_pending_request_dst,
            pending_request_dst,
            request_nonce_dst,
            has_recent_winner_dst,
            recent_winner_dst,
            entrant_count_dst,
        ) = mut_array_refs![dst, 1, 1, 32, 32, 8, 8, 32, 8, 2, 4, 4, 1, 8, 8, 1, 32, 8, 1, 32, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        bump_dst[0] = self.bump;
        creator_dst.copy_from_slice(self.creator.as_ref());
        coordinator_dst.copy_from_slice(self.config.coordinator.as_ref());
        *entrance_fee_dst = self.config.entrance_fee.to_le_bytes();
        *interval_dst = self.config.interval.to_le_bytes();
        *key_hash_dst = self.config.vrf.key_hash;
        *subscription_id_dst = self.config.vrf.subscription_id.to_le_bytes();
        *request_confirmations_dst = self.config.vrf.request_confirmations.to_le_bytes();
        *callback_gas_limit_dst = self.config.vrf.callback_gas_limit.to_le_bytes();
        *num_words_dst = self.config.vrf.num_words.to_le_bytes();
        state_dst[0] = self.state.into();
        *pooled_balance_dst = self.pooled_balance.to_le_bytes();
        *last_timestamp_dst = self.last_timestamp.to_le_bytes();
        pack_option_key(
            self.pending_request.map(|id| id.to_bytes()),
            has_pending_request_dst,
            pending_request_dst,
        );
        *request_nonce_dst = self.request_nonce.to_le_bytes();
        pack_option_key(
            self.recent_winner.map(|winner| winner.to_bytes()),
            has_recent_winner_dst,
            recent_winner_dst,
        );
        *entrant_count_dst = self.entrant_count.to_le_bytes();
    }
}

/// Decoded raffle account: header plus the current round's entrants.
/// Read accessors for clients and automation agents.
#[derive(Clone, Debug, PartialEq)]
pub struct RaffleAccount {
    pub raffle: Raffle,
    pub players: Vec<Pubkey>,
}

impl RaffleAccount {
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let header = data
            .get(..Raffle::LEN)
            .ok_or(ProgramError::InvalidAccountData)?;
        let raffle = Raffle::unpack(header)?;
        let players =
            crate::ledger::players(&raffle, data).map_err(|_| ProgramError::InvalidAccountData)?;
        Ok(Self { raffle, players })
    }

    pub fn get_entrance_fee(&self) -> u64 {
        self.raffle.config.entrance_fee
    }

    pub fn get_interval(&self) -> u64 {
        self.raffle.config.interval
    }

    pub fn get_raffle_state(&self) -> RaffleState {
        self.raffle.state
    }

    pub fn get_player(&self, index: u64) -> Result<Pubkey, RaffleError> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.players.get(index))
            .copied()
            .ok_or(RaffleError::IndexOutOfRange)
    }

    pub fn get_number_of_players(&self) -> u64 {
        self.players.len() as u64
    }

    pub fn get_recent_winner(&self) -> Option<Pubkey> {
        self.raffle.recent_winner
    }

    pub fn get_num_words(&self) -> u32 {
        self.raffle.config.vrf.num_words
    }

    pub fn get_request_confirmations(&self) -> u16 {
        self.raffle.config.vrf.request_confirmations
    }

    pub fn get_latest_timestamp(&self) -> UnixTimestamp {
        self.raffle.last_timestamp
    }

    pub fn get_pending_request(&self) -> Option<RequestId> {
        self.raffle.pending_request
    }

    pub fn get_pooled_balance(&self) -> u64 {
        self.raffle.pooled_balance
    }
}
