// Entrant ledger. The raffle account stores one 32-byte key per entry right
// after the packed `Raffle` header, in entry order. Duplicates are allowed.

use solana_program::{program_error::ProgramError, program_pack::Pack, pubkey::Pubkey};

use crate::{
    raffle_error::RaffleError,
    raffle_state::{Raffle, RaffleState},
};

pub const ENTRANT_LEN: usize = 32;

/// Account data length needed to hold `count` entrants.
pub fn account_len(count: u64) -> Result<usize, ProgramError> {
    usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(ENTRANT_LEN))
        .and_then(|len| len.checked_add(Raffle::LEN))
        .ok_or(ProgramError::ArithmeticOverflow)
}

fn slot_range(index: u64) -> Option<std::ops::Range<usize>> {
    let start = usize::try_from(index)
        .ok()?
        .checked_mul(ENTRANT_LEN)?
        .checked_add(Raffle::LEN)?;
    Some(start..start.checked_add(ENTRANT_LEN)?)
}

/// Rejects an entry that must not touch the ledger.
pub fn check_entry(raffle: &Raffle, paid_amount: u64) -> Result<(), RaffleError> {
    if raffle.state != RaffleState::Open {
        return Err(RaffleError::NotOpen);
    }
    if paid_amount < raffle.config.entrance_fee {
        return Err(RaffleError::InsufficientFee);
    }
    Ok(())
}

/// Appends `participant` and adds the payment to the pool.
///
/// `data` must already be sized for one more entrant.
pub fn enter(
    raffle: &mut Raffle,
    data: &mut [u8],
    participant: &Pubkey,
    paid_amount: u64,
) -> Result<(), ProgramError> {
    check_entry(raffle, paid_amount)?;

    let entrant_count = raffle
        .entrant_count
        .checked_add(1)
        .ok_or(ProgramError::ArithmeticOverflow)?;
    let pooled_balance = raffle
        .pooled_balance
        .checked_add(paid_amount)
        .ok_or(ProgramError::ArithmeticOverflow)?;

    let slot = slot_range(raffle.entrant_count)
        .and_then(|range| data.get_mut(range))
        .ok_or(ProgramError::AccountDataTooSmall)?;
    slot.copy_from_slice(participant.as_ref());

    raffle.entrant_count = entrant_count;
    raffle.pooled_balance = pooled_balance;
    Ok(())
}

pub fn player_at(raffle: &Raffle, data: &[u8], index: u64) -> Result<Pubkey, RaffleError> {
    if index >= raffle.entrant_count {
        return Err(RaffleError::IndexOutOfRange);
    }
    slot_range(index)
        .and_then(|range| data.get(range))
        .and_then(|bytes| Pubkey::try_from(bytes).ok())
        .ok_or(RaffleError::IndexOutOfRange)
}

pub fn count(raffle: &Raffle) -> u64 {
    raffle.entrant_count
}

pub fn players(raffle: &Raffle, data: &[u8]) -> Result<Vec<Pubkey>, RaffleError> {
    (0..raffle.entrant_count)
        .map(|index| player_at(raffle, data, index))
        .collect()
}
