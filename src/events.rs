use borsh::BorshSerialize;
use solana_program::{hash::Hash, log::sol_log_data, msg, pubkey::Pubkey};

/// Observable raffle events, logged as borsh-encoded program data.
#[derive(BorshSerialize, Clone, Debug, PartialEq)]
pub enum RaffleEvent {
    RaffleEnter {
        player: Pubkey,
    },
    RequestedRaffleWinner {
        request_id: [u8; 32],
    },
    /// Published for the off-chain coordinator
    RandomWordsRequested {
        request_id: [u8; 32],
        key_hash: [u8; 32],
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
        requester: Pubkey,
    },
    WinnerPicked {
        winner: Pubkey,
        amount: u64,
    },
}

impl RaffleEvent {
    pub fn emit(&self) {
        match self {
            RaffleEvent::RaffleEnter { player } => msg!("RaffleEnter: {}", player),
            RaffleEvent::RequestedRaffleWinner { request_id } => {
                msg!("RequestedRaffleWinner: {}", Hash::new_from_array(*request_id))
            }
            RaffleEvent::RandomWordsRequested { requester, num_words, .. } => {
                msg!("RandomWordsRequested: requester={} words={}", requester, num_words)
            }
            RaffleEvent::WinnerPicked { winner, amount } => {
                msg!("WinnerPicked: {} amount={}", winner, amount)
            }
        }
        match borsh::to_vec(self) {
            Ok(data) => sol_log_data(&[&data]),
            Err(err) => msg!("Failed to encode event: {}", err),
        }
    }
}
