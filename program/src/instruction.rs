use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::convert::TryInto;

use crate::{constants::MAX_RANDOM_WORDS, error::RaffleError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RaffleInstruction {
    /// Initialize the mock VRF coordinator
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle allowed to fulfill requests
    /// 1. `[writable]` The coordinator account, pre-created and owned by this program
    InitializeCoordinator,

    /// Initialize a raffle
    ///
    /// Accounts expected:
    /// 0. `[signer]` The raffle authority
    /// 1. `[writable]` The raffle account, pre-created and owned by this program
    /// 2. `[]` The coordinator account the raffle draws from
    InitializeRaffle {
        /// Minimum payment per entry in lamports
        entrance_fee: u64,
        /// Seconds between draws
        interval: u64,
    },

    /// Enter the raffle
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player paying the entry
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Payment in lamports, at least the entrance fee
        amount: u64,
    },

    /// Evaluate the upkeep conditions without changing any account.
    /// The borsh-encoded `UpkeepStatus` is set as return data.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep,

    /// Start a draw when upkeep is needed (anyone can trigger it)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The caller
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The raffle's coordinator account
    PerformUpkeep,

    /// Deliver random words for a pending request (coordinator oracle only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The coordinator oracle
    /// 1. `[writable]` The coordinator account
    /// 2. `[writable]` The consumer raffle account
    /// 3. `[writable]` The winning player, receives the pot
    FulfillRandomWords {
        request_id: u64,
        /// Words to deliver; empty lets the coordinator derive them
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
            0 => Self::InitializeCoordinator,
            1 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, _) = Self::unpack_u64(rest)?;
                Self::InitializeRaffle {
                    entrance_fee,
                    interval,
                }
            }
            2 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            3 => Self::CheckUpkeep,
            4 => Self::PerformUpkeep,
            5 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = rest
                    .split_first()
                    .ok_or(RaffleError::InvalidInstructionData)?;
                if *count as usize > MAX_RANDOM_WORDS {
                    return Err(RaffleError::InvalidInstructionData.into());
                }
                let mut random_words = Vec::with_capacity(*count as usize);
                for _ in 0..*count {
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
            Self::InitializeCoordinator => buf.push(0),
            Self::InitializeRaffle {
                entrance_fee,
                interval,
            } => {
                buf.push(1);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
            }
            Self::EnterRaffle { amount } => {
                buf.push(2);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(3),
            Self::PerformUpkeep => buf.push(4),
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(5);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.push(random_words.len() as u8);
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let value = input
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(RaffleError::InvalidInstructionData)?;
        Ok((value, &input[8..]))
    }
}

/// Create initialize_coordinator instruction
pub fn initialize_coordinator(
    program_id: &Pubkey,
    oracle: &Pubkey,
    coordinator: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*oracle, true),
            AccountMeta::new(*coordinator, false),
        ],
        data: RaffleInstruction::InitializeCoordinator.pack(),
    }
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    authority: &Pubkey,
    raffle: &Pubkey,
    coordinator: &Pubkey,
    entrance_fee: u64,
    interval: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*raffle, false),
            AccountMeta::new_readonly(*coordinator, false),
        ],
        data: RaffleInstruction::InitializeRaffle {
            entrance_fee,
            interval,
        }
        .pack(),
    }
}

/// Create enter_raffle instruction
pub fn enter_raffle(program_id: &Pubkey, player: &Pubkey, raffle: &Pubkey, amount: u64) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*player, true),
            AccountMeta::new(*raffle, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: RaffleInstruction::EnterRaffle { amount }.pack(),
    }
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, raffle: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*raffle, false)],
        data: RaffleInstruction::CheckUpkeep.pack(),
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle: &Pubkey,
    coordinator: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(*raffle, false),
            AccountMeta::new(*coordinator, false),
        ],
        data: RaffleInstruction::PerformUpkeep.pack(),
    }
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    oracle: &Pubkey,
    coordinator: &Pubkey,
    raffle: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*oracle, true),
            AccountMeta::new(*coordinator, false),
            AccountMeta::new(*raffle, false),
            AccountMeta::new(*winner, false),
        ],
        data: RaffleInstruction::FulfillRandomWords {
            request_id,
            random_words,
        }
        .pack(),
    }
}
