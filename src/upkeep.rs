// Automation predicate deciding when a round may be closed.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::clock::UnixTimestamp;

use crate::raffle_state::{Raffle, RaffleState};

/// Snapshot of the values the predicate looked at, logged on rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
}

impl UpkeepStatus {
    pub fn of(raffle: &Raffle, now: UnixTimestamp) -> Self {
        let elapsed = now.saturating_sub(raffle.last_timestamp);
        Self {
            is_open: raffle.state == RaffleState::Open,
            time_passed: elapsed >= 0 && elapsed as u64 >= raffle.config.interval,
            has_players: raffle.entrant_count > 0,
            has_balance: raffle.pooled_balance > 0,
        }
    }

    pub fn upkeep_needed(&self) -> bool {
        self.is_open && self.time_passed && self.has_players && self.has_balance
    }
}

/// Return data of the `CheckUpkeep` instruction
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CheckUpkeepResult {
    pub upkeep_needed: bool,
    pub perform_data: Vec<u8>,
}

pub fn upkeep_needed(raffle: &Raffle, now: UnixTimestamp) -> bool {
    UpkeepStatus::of(raffle, now).upkeep_needed()
}

/// Returns whether upkeep is needed and the data to hand to `PerformUpkeep`.
/// `check_data` is accepted for interface compatibility and not inspected.
pub fn check_upkeep(raffle: &Raffle, now: UnixTimestamp, _check_data: &[u8]) -> (bool, Vec<u8>) {
    (upkeep_needed(raffle, now), Vec::new())
}
