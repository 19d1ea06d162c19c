// Raffle account state and the draw state machine
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
};
use std::fmt;

use crate::{
    constants::{DEFAULT_ENTRANCE_FEE, DEFAULT_INTERVAL, MAX_ENTRANTS, NUM_WORDS},
    error::RaffleError,
    vrf::{self, RandomnessProvider},
};

/// Lifecycle of a raffle
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Waiting for the randomness coordinator to fulfill the draw
    Calculating,
}

/// Parameters fixed when the raffle is initialized
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Minimum payment per entry in lamports
    pub entrance_fee: u64,
    /// Minimum seconds between the last draw and the next upkeep
    pub interval: u64,
}

impl RaffleConfig {
    pub fn new(entrance_fee: u64, interval: u64) -> Result<Self, RaffleError> {
        if entrance_fee == 0 || interval > i64::MAX as u64 {
            return Err(RaffleError::InvalidConfig);
        }
        Ok(Self {
            entrance_fee,
            interval,
        })
    }
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            entrance_fee: DEFAULT_ENTRANCE_FEE,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Result of evaluating the upkeep conditions, with the values behind it
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    pub state: RaffleState,
    pub time_passed: bool,
    pub players: u64,
    pub balance: u64,
}

impl fmt::Display for UpkeepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "upkeep_needed={} state={:?} time_passed={} players={} balance={}",
            self.upkeep_needed, self.state, self.time_passed, self.players, self.balance
        )
    }
}

/// A finalized draw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawOutcome {
    pub winner: Pubkey,
    pub winner_index: u64,
    pub prize: u64,
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Raffle {
    is_initialized: bool,
    /// Account that created the raffle. Recorded for reference only, no
    /// instruction is restricted to it.
    authority: Pubkey,
    /// Randomness coordinator the raffle requests draws from
    coordinator: Pubkey,
    config: RaffleConfig,
    state: RaffleState,
    /// Time of the last completed draw (or of initialization)
    last_timestamp: UnixTimestamp,
    /// Request id of the in-flight draw, set only while calculating
    pending_request: Option<u64>,
    /// Zero until the first draw completes
    recent_winner: Pubkey,
    /// Entry payments held on top of the rent-exempt reserve
    pot: u64,
    players: Vec<Pubkey>,
}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    /// Account size with room for `MAX_ENTRANTS` players
    pub const LEN: usize = 1 // is_initialized
        + 32 // authority
        + 32 // coordinator
        + 8 + 8 // config
        + 1 // state
        + 8 // last_timestamp
        + 1 + 8 // pending_request
        + 32 // recent_winner
        + 8 // pot
        + 4 + 32 * MAX_ENTRANTS; // players

    pub fn new(
        authority: Pubkey,
        coordinator: Pubkey,
        config: RaffleConfig,
        now: UnixTimestamp,
    ) -> Self {
        Self {
            is_initialized: true,
            authority,
            coordinator,
            config,
            state: RaffleState::Open,
            last_timestamp: now,
            pending_request: None,
            recent_winner: Pubkey::default(),
            pot: 0,
            players: Vec::new(),
        }
    }

    /// Reads a raffle from account data. Only an account of exactly `LEN`
    /// bytes holds a raffle; trailing bytes are the unused part of the
    /// entrant list and are ignored.
    pub fn unpack_from_account(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() != Self::LEN {
            return Err(ProgramError::InvalidAccountData);
        }
        let mut buf = data;
        Self::deserialize(&mut buf).map_err(|_| ProgramError::InvalidAccountData)
    }

    pub fn pack_into_account(&self, dst: &mut [u8]) -> ProgramResult {
        let mut writer = dst;
        self.serialize(&mut writer)
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }

    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    pub fn coordinator(&self) -> &Pubkey {
        &self.coordinator
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.config.interval
    }

    pub fn state(&self) -> RaffleState {
        self.state
    }

    pub fn player(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    pub fn players(&self) -> &[Pubkey] {
        &self.players
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }

    pub fn latest_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn recent_winner(&self) -> &Pubkey {
        &self.recent_winner
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending_request
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn num_words(&self) -> u32 {
        NUM_WORDS
    }

    /// Adds `player` to the draw. The payment is checked before the state,
    /// and nothing changes on failure.
    pub fn enter(&mut self, player: Pubkey, payment: u64) -> Result<(), RaffleError> {
        if payment < self.config.entrance_fee {
            return Err(RaffleError::NotEnoughFunds);
        }
        if self.state != RaffleState::Open {
            return Err(RaffleError::NotOpen);
        }
        if self.players.len() >= MAX_ENTRANTS {
            return Err(RaffleError::RaffleFull);
        }
        let pot = self
            .pot
            .checked_add(payment)
            .ok_or(RaffleError::MathOverflow)?;

        self.players.push(player);
        self.pot = pot;
        Ok(())
    }

    /// Evaluates whether a draw can start at `now`. Never mutates.
    pub fn check_upkeep(&self, now: UnixTimestamp) -> UpkeepStatus {
        let elapsed = now.saturating_sub(self.last_timestamp);
        let time_passed = u64::try_from(elapsed).map_or(false, |e| e >= self.config.interval);
        let is_open = self.state == RaffleState::Open;
        let has_players = !self.players.is_empty();
        let has_balance = self.pot > 0;

        UpkeepStatus {
            upkeep_needed: is_open && time_passed && has_players && has_balance,
            state: self.state,
            time_passed,
            players: self.players.len() as u64,
            balance: self.pot,
        }
    }

    /// Starts a draw: requests randomness once and moves to `Calculating`.
    /// Returns the request id recorded as the pending request.
    pub fn perform_upkeep<P: RandomnessProvider>(
        &mut self,
        raffle_key: &Pubkey,
        now: UnixTimestamp,
        provider: &mut P,
    ) -> Result<u64, RaffleError> {
        if !self.check_upkeep(now).upkeep_needed {
            return Err(RaffleError::UpkeepNotNeeded);
        }

        let request_id = provider.request_random_words(raffle_key, NUM_WORDS)?;
        self.state = RaffleState::Calculating;
        self.pending_request = Some(request_id);
        Ok(request_id)
    }

    /// Completes the pending draw with the delivered random words.
    ///
    /// `payout` moves the prize to the winner. If it fails the raffle stays
    /// `Calculating` with its entrants and pending request intact, so the
    /// fulfillment can be retried.
    pub fn fulfill_random_words<F>(
        &mut self,
        request_id: u64,
        random_words: &[u64],
        now: UnixTimestamp,
        payout: F,
    ) -> Result<DrawOutcome, RaffleError>
    where
        F: FnOnce(&Pubkey, u64) -> Result<(), RaffleError>,
    {
        if self.state != RaffleState::Calculating || self.pending_request != Some(request_id) {
            return Err(RaffleError::UnknownRequest);
        }
        let random_word = *random_words.first().ok_or(RaffleError::NoRandomWords)?;
        let winner_index = vrf::get_random_winner_index(random_word, self.players.len() as u64)
            .ok_or(RaffleError::NoEntrants)?;
        let winner = self.players[winner_index as usize];
        let prize = self.pot;

        payout(&winner, prize).map_err(|_| RaffleError::PayoutFailed)?;

        self.players.clear();
        self.pot = 0;
        self.recent_winner = winner;
        self.last_timestamp = now;
        self.pending_request = None;
        self.state = RaffleState::Open;

        Ok(DrawOutcome {
            winner,
            winner_index,
            prize,
        })
    }
}
