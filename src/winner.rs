use crate::raffle_error::RaffleError;

/// Maps a random value onto an entrant index: `random_value % entrant_count`.
pub fn winner_index(entrant_count: u64, random_value: u64) -> Result<u64, RaffleError> {
    if entrant_count == 0 {
        return Err(RaffleError::EmptyEntrantSet);
    }
    Ok(random_value % entrant_count)
}
