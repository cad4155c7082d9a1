// Automated raffle with verifiable randomness
// Entry, upkeep-driven close, VRF request/fulfillment and payout on Solana

pub mod events;
pub mod ledger;
pub mod payout;
pub mod upkeep;
pub mod vrf;
pub mod winner;

pub mod raffle_error;
pub mod raffle_instruction;
pub mod raffle_processor;
pub mod raffle_state;

#[cfg(not(feature = "no-entrypoint"))]
pub mod raffle_entrypoint;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    raffle_processor::Processor::process(program_id, accounts, instruction_data)
}
