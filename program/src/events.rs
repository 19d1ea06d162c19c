// Structured events emitted through the program log
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult, hash::hashv, log::sol_log_data, msg, program_error::ProgramError,
    pubkey::Pubkey,
};
use std::fmt::Debug;

/// An event is logged as one `sol_log_data` record: an 8-byte discriminator
/// derived from the event name, followed by the borsh payload.
pub trait Event: BorshSerialize + BorshDeserialize + Debug {
    const NAME: &'static str;

    fn discriminator() -> [u8; 8] {
        let hash = hashv(&[b"event:", Self::NAME.as_bytes()]).to_bytes();
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&hash[..8]);
        discriminator
    }

    fn encode(&self) -> Result<Vec<u8>, ProgramError> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        Ok(data)
    }

    /// Parses a log record back into the event, if it is one of ours
    fn decode(data: &[u8]) -> Option<Self> {
        let (discriminator, mut payload) = (data.get(..8)?, data.get(8..)?);
        if discriminator != Self::discriminator() {
            return None;
        }
        Self::deserialize(&mut payload).ok()
    }

    fn emit(&self) -> ProgramResult {
        let data = self.encode()?;
        sol_log_data(&[data.as_slice()]);
        msg!("{}: {:?}", Self::NAME, self);
        Ok(())
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleEntered {
    pub raffle: Pubkey,
    pub player: Pubkey,
    pub amount: u64,
}

impl Event for RaffleEntered {
    const NAME: &'static str = "RaffleEntered";
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WinnerRequested {
    pub raffle: Pubkey,
    pub request_id: u64,
}

impl Event for WinnerRequested {
    const NAME: &'static str = "WinnerRequested";
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WinnerPicked {
    pub raffle: Pubkey,
    pub winner: Pubkey,
    pub prize: u64,
}

impl Event for WinnerPicked {
    const NAME: &'static str = "WinnerPicked";
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsRequested {
    pub coordinator: Pubkey,
    pub request_id: u64,
    pub consumer: Pubkey,
    pub num_words: u32,
}

impl Event for RandomWordsRequested {
    const NAME: &'static str = "RandomWordsRequested";
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsFulfilled {
    pub coordinator: Pubkey,
    pub request_id: u64,
    pub consumer: Pubkey,
}

impl Event for RandomWordsFulfilled {
    const NAME: &'static str = "RandomWordsFulfilled";
}
