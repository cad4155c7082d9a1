use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError, program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the Raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Payment was below the entrance fee
    #[error("Not enough lamports paid to enter the raffle")]
    InsufficientFee,

    /// Entry attempted while a winner is being calculated
    #[error("Raffle is not open")]
    NotOpen,

    /// The upkeep predicate does not hold
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// No entrant at the requested index
    #[error("Player index out of range")]
    IndexOutOfRange,

    /// Winner selection over an empty entrant set
    #[error("No entrants to select a winner from")]
    EmptyEntrantSet,

    /// The prize could not be moved to the winner
    #[error("Transfer to winner failed")]
    TransferFailed,

    /// Fulfillment does not match the pending request
    #[error("Request id does not match the pending request")]
    RequestIdMismatch,

    /// Fulfillment was not signed by the configured coordinator
    #[error("Only the VRF coordinator can fulfill randomness")]
    OnlyCoordinatorCanFulfill,

    /// Construction parameters rejected
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
