use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack},
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    error::RaffleError,
    events::{
        Event, RaffleEntered, RandomWordsFulfilled, RandomWordsRequested, WinnerPicked,
        WinnerRequested,
    },
    instruction::RaffleInstruction,
    state::{Raffle, RaffleConfig},
    utils::{self, assert_owned_by, assert_signer, assert_writable},
    vrf::VrfCoordinator,
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeCoordinator => {
                msg!("Instruction: Initialize Coordinator");
                Self::process_initialize_coordinator(accounts, program_id)
            }
            RaffleInstruction::InitializeRaffle {
                entrance_fee,
                interval,
            } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, entrance_fee, interval, program_id)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    fn process_initialize_coordinator(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        assert_signer(oracle_info, "Oracle")?;
        assert_owned_by(coordinator_info, program_id, "Coordinator")?;
        assert_writable(coordinator_info, "Coordinator")?;
        Self::assert_rent_exempt(coordinator_info)?;

        let existing = VrfCoordinator::unpack_unchecked(&coordinator_info.data.borrow())?;
        if existing.is_initialized() {
            msg!("Coordinator account is already initialized");
            return Err(RaffleError::AlreadyInitialized.into());
        }

        let coordinator = VrfCoordinator::new(*oracle_info.key);
        VrfCoordinator::pack(coordinator, &mut coordinator_info.data.borrow_mut())?;

        msg!("Coordinator initialized: Oracle={}", oracle_info.key);
        Ok(())
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        assert_signer(authority_info, "Authority")?;
        assert_owned_by(raffle_info, program_id, "Raffle")?;
        assert_owned_by(coordinator_info, program_id, "Coordinator")?;
        assert_writable(raffle_info, "Raffle")?;

        if raffle_info.data_len() != Raffle::LEN {
            msg!("Raffle account must be {} bytes", Raffle::LEN);
            return Err(ProgramError::InvalidAccountData);
        }
        Self::assert_rent_exempt(raffle_info)?;

        // The coordinator must be live before a raffle can bind to it
        VrfCoordinator::unpack(&coordinator_info.data.borrow())?;

        let existing = Raffle::unpack_from_account(&raffle_info.data.borrow())?;
        if existing.is_initialized() {
            msg!("Raffle account is already initialized");
            return Err(RaffleError::AlreadyInitialized.into());
        }

        let config = RaffleConfig::new(entrance_fee, interval)?;
        let clock = Clock::get()?;
        let raffle = Raffle::new(
            *authority_info.key,
            *coordinator_info.key,
            config,
            clock.unix_timestamp,
        );
        raffle.pack_into_account(&mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: EntranceFee={} SOL, Interval={}s, Coordinator={}",
            utils::lamports_to_sol(entrance_fee),
            interval,
            coordinator_info.key
        );
        Ok(())
    }

    fn process_enter_raffle(accounts: &[AccountInfo], amount: u64, program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        assert_signer(player_info, "Player")?;
        assert_owned_by(raffle_info, program_id, "Raffle")?;
        assert_writable(raffle_info, "Raffle")?;
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Self::load_raffle(raffle_info)?;
        if let Err(err) = raffle.enter(*player_info.key, amount) {
            msg!(
                "Entry rejected: paid {} lamports, fee {} lamports, state {:?}",
                amount,
                raffle.entrance_fee(),
                raffle.state()
            );
            return Err(err.into());
        }

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.pack_into_account(&mut raffle_info.data.borrow_mut())?;

        RaffleEntered {
            raffle: *raffle_info.key,
            player: *player_info.key,
            amount,
        }
        .emit()?;
        msg!(
            "Player {} entered with {} SOL ({} players)",
            player_info.key,
            utils::lamports_to_sol(amount),
            raffle.number_of_players()
        );
        Ok(())
    }

    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        assert_owned_by(raffle_info, program_id, "Raffle")?;
        let raffle = Self::load_raffle(raffle_info)?;
        let status = raffle.check_upkeep(Clock::get()?.unix_timestamp);

        let data = status
            .try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        set_return_data(&data);

        msg!("Upkeep status: {}", status);
        Ok(())
    }

    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        assert_signer(caller_info, "Caller")?;
        assert_owned_by(raffle_info, program_id, "Raffle")?;
        assert_owned_by(coordinator_info, program_id, "Coordinator")?;
        assert_writable(raffle_info, "Raffle")?;
        assert_writable(coordinator_info, "Coordinator")?;

        let mut raffle = Self::load_raffle(raffle_info)?;
        if raffle.coordinator() != coordinator_info.key {
            msg!("Raffle draws from coordinator {}", raffle.coordinator());
            return Err(RaffleError::CoordinatorMismatch.into());
        }
        let mut coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;

        let now = Clock::get()?.unix_timestamp;
        let status = raffle.check_upkeep(now);
        if !status.upkeep_needed {
            msg!("Upkeep not needed: {}", status);
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        let request_id = raffle.perform_upkeep(raffle_info.key, now, &mut coordinator)?;

        VrfCoordinator::pack(coordinator, &mut coordinator_info.data.borrow_mut())?;
        raffle.pack_into_account(&mut raffle_info.data.borrow_mut())?;

        RandomWordsRequested {
            coordinator: *coordinator_info.key,
            request_id,
            consumer: *raffle_info.key,
            num_words: raffle.num_words(),
        }
        .emit()?;
        WinnerRequested {
            raffle: *raffle_info.key,
            request_id,
        }
        .emit()?;
        Ok(())
    }

    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        assert_signer(oracle_info, "Oracle")?;
        assert_owned_by(coordinator_info, program_id, "Coordinator")?;
        assert_owned_by(raffle_info, program_id, "Raffle")?;
        assert_writable(coordinator_info, "Coordinator")?;
        assert_writable(raffle_info, "Raffle")?;

        let mut coordinator = VrfCoordinator::unpack(&coordinator_info.data.borrow())?;
        if coordinator.oracle != *oracle_info.key {
            msg!("Only oracle {} can fulfill requests", coordinator.oracle);
            return Err(RaffleError::Unauthorized.into());
        }

        let mut raffle = Self::load_raffle(raffle_info)?;
        if raffle.coordinator() != coordinator_info.key {
            msg!("Raffle draws from coordinator {}", raffle.coordinator());
            return Err(RaffleError::CoordinatorMismatch.into());
        }

        let words = coordinator.random_words_for(request_id, random_words);
        let now = Clock::get()?.unix_timestamp;

        let outcome = raffle
            .fulfill_random_words(request_id, &words, now, |winner, prize| {
                if winner != winner_info.key {
                    msg!("Winner account {} does not match drawn winner {}", winner_info.key, winner);
                    return Err(RaffleError::PayoutFailed);
                }
                assert_writable(winner_info, "Winner").map_err(|_| RaffleError::PayoutFailed)?;
                utils::transfer_lamports(raffle_info, winner_info, prize)
            })
            .map_err(|err| {
                msg!("Fulfillment of request {} rejected: {}", request_id, err);
                err
            })?;

        coordinator.complete_request(request_id, raffle_info.key)?;

        VrfCoordinator::pack(coordinator, &mut coordinator_info.data.borrow_mut())?;
        raffle.pack_into_account(&mut raffle_info.data.borrow_mut())?;

        RandomWordsFulfilled {
            coordinator: *coordinator_info.key,
            request_id,
            consumer: *raffle_info.key,
        }
        .emit()?;
        WinnerPicked {
            raffle: *raffle_info.key,
            winner: outcome.winner,
            prize: outcome.prize,
        }
        .emit()?;
        msg!(
            "Winner {} (entry {}) received {} SOL",
            outcome.winner,
            outcome.winner_index,
            utils::lamports_to_sol(outcome.prize)
        );
        Ok(())
    }

    fn load_raffle(raffle_info: &AccountInfo) -> Result<Raffle, ProgramError> {
        let raffle = Raffle::unpack_from_account(&raffle_info.data.borrow())?;
        if !raffle.is_initialized() {
            msg!("Raffle account is not initialized");
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(raffle)
    }

    fn assert_rent_exempt(account_info: &AccountInfo) -> ProgramResult {
        let rent = Rent::get()?;
        if !rent.is_exempt(account_info.lamports(), account_info.data_len()) {
            msg!("Account {} is not rent exempt", account_info.key);
            return Err(ProgramError::AccountNotRentExempt);
        }
        Ok(())
    }
}
