use crate::events::RaffleEvent;
use crate::ledger;
use crate::payout;
use crate::raffle_error::RaffleError;
use crate::raffle_instruction::{find_raffle_address, RaffleInstruction, RAFFLE_SEED};
use crate::raffle_state::{Raffle, RaffleConfig, VrfConfig};
use crate::upkeep::{self, CheckUpkeepResult};
use crate::vrf;
use crate::winner;

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    hash::Hash,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
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
            RaffleInstruction::InitializeRaffle {
                entrance_fee,
                interval,
                vrf,
            } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, entrance_fee, interval, vrf, program_id)
            }
            RaffleInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep { check_data } => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, &check_data, program_id)
            }
            RaffleInstruction::PerformUpkeep { perform_data } => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, &perform_data, program_id)
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

    fn load_raffle(raffle_info: &AccountInfo, program_id: &Pubkey) -> Result<Raffle, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let data = raffle_info.try_borrow_data()?;
        let header = data
            .get(..Raffle::LEN)
            .ok_or(ProgramError::InvalidAccountData)?;
        Raffle::unpack(header)
    }

    fn store_raffle(raffle: Raffle, raffle_info: &AccountInfo) -> ProgramResult {
        let mut data = raffle_info.try_borrow_mut_data()?;
        let header = data
            .get_mut(..Raffle::LEN)
            .ok_or(ProgramError::InvalidAccountData)?;
        Raffle::pack(raffle, header)
    }

    /// Creates the raffle PDA and opens the first round.
    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: u64,
        vrf: VrfConfig,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !creator_info.is_signer {
            msg!("Creator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let config = RaffleConfig {
            coordinator: *coordinator_info.key,
            entrance_fee,
            interval,
            vrf,
        };
        if let Err(err) = config.validate() {
            msg!(
                "Rejected config: fee={}, interval={}, words={}",
                entrance_fee,
                interval,
                vrf.num_words
            );
            return Err(err.into());
        }

        let rent = Rent::get()?;
        // a prize below this could not fund an emptied winner account
        let min_prize = rent.minimum_balance(0);
        if entrance_fee < min_prize {
            msg!(
                "Entrance fee {} is below the rent-exempt minimum {}",
                entrance_fee,
                min_prize
            );
            return Err(RaffleError::InvalidConfig.into());
        }

        let (expected_raffle, bump_seed) = find_raffle_address(program_id, creator_info.key);
        if *raffle_info.key != expected_raffle {
            msg!("Invalid raffle account address");
            return Err(ProgramError::InvalidArgument);
        }
        if raffle_info.owner == program_id {
            msg!("Raffle account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        invoke_signed(
            &system_instruction::create_account(
                creator_info.key,
                raffle_info.key,
                rent.minimum_balance(Raffle::LEN),
                Raffle::LEN as u64,
                program_id,
            ),
            &[
                creator_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
            &[&[RAFFLE_SEED, creator_info.key.as_ref(), &[bump_seed]]],
        )?;

        let now = Clock::get()?.unix_timestamp;
        let raffle = Raffle::new(*creator_info.key, bump_seed, config, now);
        Self::store_raffle(raffle, raffle_info)?;

        msg!(
            "Raffle initialized: Fee={}, Interval={}s, Coordinator={}",
            entrance_fee,
            interval,
            coordinator_info.key
        );
        Ok(())
    }

    /// Appends the entrant to the current round. The entrant also covers the
    /// rent for the extra ledger slot; rent never counts towards the pool.
    ///
    /// Slot rent is not refunded to the winner. It stays in the raffle account
    /// after the shrink at payout and offsets the top-ups of later rounds, so
    /// entrants of the next round pay only the fee until the ledger outgrows
    /// the previous peak.
    fn process_enter_raffle(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let entrant_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !entrant_info.is_signer {
            msg!("Entrant must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;

        if let Err(err) = ledger::check_entry(&raffle, amount) {
            msg!(
                "Entry rejected: paid={}, fee={}, state={:?}",
                amount,
                raffle.config.entrance_fee,
                raffle.state
            );
            return Err(err.into());
        }

        let next_count = raffle
            .entrant_count
            .checked_add(1)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        let new_len = ledger::account_len(next_count)?;
        let rent = Rent::get()?;
        let rent_reserve = raffle_info.lamports().saturating_sub(raffle.pooled_balance);
        let rent_top_up = rent.minimum_balance(new_len).saturating_sub(rent_reserve);
        let total = amount
            .checked_add(rent_top_up)
            .ok_or(ProgramError::ArithmeticOverflow)?;

        if entrant_info.lamports() < total {
            msg!(
                "Insufficient funds: needed {} lamports, had {} lamports",
                total,
                entrant_info.lamports()
            );
            return Err(ProgramError::InsufficientFunds);
        }

        invoke(
            &system_instruction::transfer(entrant_info.key, raffle_info.key, total),
            &[
                entrant_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle_info.realloc(new_len, false)?;
        {
            let mut data = raffle_info.try_borrow_mut_data()?;
            ledger::enter(&mut raffle, &mut data, entrant_info.key, amount)?;
        }
        Self::store_raffle(raffle, raffle_info)?;

        RaffleEvent::RaffleEnter {
            player: *entrant_info.key,
        }
        .emit();
        msg!(
            "Players: {}, pool: {} lamports",
            ledger::count(&raffle),
            raffle.pooled_balance
        );
        Ok(())
    }

    fn process_check_upkeep(
        accounts: &[AccountInfo],
        check_data: &[u8],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(raffle_info, program_id)?;
        let now = Clock::get()?.unix_timestamp;

        let (upkeep_needed, perform_data) = upkeep::check_upkeep(&raffle, now, check_data);
        msg!("Upkeep needed: {}", upkeep_needed);

        let result = CheckUpkeepResult {
            upkeep_needed,
            perform_data,
        };
        let encoded =
            borsh::to_vec(&result).map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        set_return_data(&encoded);
        Ok(())
    }

    /// Closes entry and publishes the randomness request. Anyone may call it;
    /// the upkeep predicate is the only gate.
    fn process_perform_upkeep(
        accounts: &[AccountInfo],
        perform_data: &[u8],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;
        let now = Clock::get()?.unix_timestamp;

        let request = vrf::request_close(raffle_info.key, &mut raffle, now)?;
        Self::store_raffle(raffle, raffle_info)?;

        request.event().emit();
        RaffleEvent::RequestedRaffleWinner {
            request_id: request.request_id.to_bytes(),
        }
        .emit();
        msg!(
            "Round closed by {} with {} players ({} bytes perform data)",
            caller_info.key,
            raffle.entrant_count,
            perform_data.len()
        );
        Ok(())
    }

    /// Accepts the coordinator's answer for the pending request, pays the
    /// winner and opens the next round. Answers to any other request are
    /// logged and ignored.
    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: [u8; 32],
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let recipient_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(raffle_info, program_id)?;

        if !coordinator_info.is_signer || *coordinator_info.key != raffle.config.coordinator {
            msg!("Fulfillment from {} rejected", coordinator_info.key);
            return Err(RaffleError::OnlyCoordinatorCanFulfill.into());
        }

        let request_id = Hash::new_from_array(request_id);
        if let Err(err) = vrf::match_fulfillment(&raffle, &request_id) {
            msg!("Ignoring fulfillment for {}: {}", request_id, err);
            return Ok(());
        }

        let random_value = *random_words
            .first()
            .ok_or(RaffleError::InvalidInstructionData)?;
        let index = winner::winner_index(ledger::count(&raffle), random_value)?;
        let winner = {
            let data = raffle_info.try_borrow_data()?;
            ledger::player_at(&raffle, &data, index)?
        };
        msg!("Random winner index: {}", index);

        let prize = raffle.pooled_balance;
        let reserve = Rent::get()?.minimum_balance(Raffle::LEN);
        payout::pay_winner(raffle_info, recipient_info, &winner, prize, reserve)?;

        let now = Clock::get()?.unix_timestamp;
        raffle.reset_round(winner, now);
        raffle_info.realloc(Raffle::LEN, false)?;
        Self::store_raffle(raffle, raffle_info)?;

        RaffleEvent::WinnerPicked {
            winner,
            amount: prize,
        }
        .emit();
        Ok(())
    }
}
