use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError, program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    #[error("Account is already initialized")]
    AlreadyInitialized,

    /// Entrance fee must be non-zero
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    /// Payment below the entrance fee
    #[error("Not enough funds entered")]
    NotEnoughFunds,

    /// Raffle is calculating a winner
    #[error("Raffle is not open")]
    NotOpen,

    #[error("Raffle has reached the maximum number of entrants")]
    RaffleFull,

    /// Upkeep conditions do not currently hold
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Request id does not match the raffle's pending draw
    #[error("Unknown randomness request")]
    UnknownRequest,

    #[error("Fulfillment carried no random words")]
    NoRandomWords,

    #[error("No entrants to draw from")]
    NoEntrants,

    /// Prize could not be moved to the winner
    #[error("Payout to winner failed")]
    PayoutFailed,

    /// Signer is not the coordinator's oracle
    #[error("Unauthorized fulfillment")]
    Unauthorized,

    /// Raffle is bound to a different randomness coordinator
    #[error("Coordinator does not match raffle")]
    CoordinatorMismatch,

    #[error("Randomness request table is full")]
    RequestTableFull,

    /// Request was issued for another consumer
    #[error("Request consumer mismatch")]
    ConsumerMismatch,

    #[error("Arithmetic overflow")]
    MathOverflow,
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
