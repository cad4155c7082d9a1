use solana_program::{account_info::AccountInfo, msg, pubkey::Pubkey};

use crate::raffle_error::RaffleError;

/// Moves `amount` lamports from the program-owned raffle account to the winner.
///
/// `reserve` is the rent-exempt minimum the raffle account must keep. Nothing
/// is debited unless every check passes.
pub fn pay_winner(
    raffle_info: &AccountInfo,
    recipient_info: &AccountInfo,
    winner: &Pubkey,
    amount: u64,
    reserve: u64,
) -> Result<(), RaffleError> {
    if recipient_info.key != winner {
        msg!("Recipient {} is not the selected winner {}", recipient_info.key, winner);
        return Err(RaffleError::TransferFailed);
    }
    if !recipient_info.is_writable {
        msg!("Winner account {} is not writable", recipient_info.key);
        return Err(RaffleError::TransferFailed);
    }
    if recipient_info.key == raffle_info.key {
        return Err(RaffleError::TransferFailed);
    }

    let available = raffle_info.lamports().saturating_sub(reserve);
    if available < amount {
        msg!("Raffle holds {} spendable lamports, prize is {}", available, amount);
        return Err(RaffleError::TransferFailed);
    }
    let source_balance = raffle_info
        .lamports()
        .checked_sub(amount)
        .ok_or(RaffleError::TransferFailed)?;
    let recipient_balance = recipient_info
        .lamports()
        .checked_add(amount)
        .ok_or(RaffleError::TransferFailed)?;

    let mut source = raffle_info
        .try_borrow_mut_lamports()
        .map_err(|_| RaffleError::TransferFailed)?;
    let mut recipient = recipient_info
        .try_borrow_mut_lamports()
        .map_err(|_| RaffleError::TransferFailed)?;
    **source = source_balance;
    **recipient = recipient_balance;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::system_program;

    struct TestAccount {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    }

    impl TestAccount {
        fn new(lamports: u64, owner: Pubkey) -> Self {
            Self {
                key: Pubkey::new_unique(),
                owner,
                lamports,
                data: vec![],
            }
        }

        fn info(&mut self, is_writable: bool) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                false,
                is_writable,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                false,
                0,
            )
        }
    }

    #[test]
    fn test_pays_full_amount_to_winner() {
        let program_id = Pubkey::new_unique();
        let mut raffle = TestAccount::new(1_000 + 50, program_id);
        let mut winner = TestAccount::new(5, system_program::id());
        let winner_key = winner.key;

        {
            let raffle_info = raffle.info(true);
            let winner_info = winner.info(true);
            pay_winner(&raffle_info, &winner_info, &winner_key, 1_000, 50).unwrap();
        }

        assert_eq!(raffle.lamports, 50);
        assert_eq!(winner.lamports, 1_005);
    }

    #[test]
    fn test_wrong_recipient_fails_without_moving_funds() {
        let program_id = Pubkey::new_unique();
        let mut raffle = TestAccount::new(1_050, program_id);
        let mut other = TestAccount::new(5, system_program::id());
        let winner_key = Pubkey::new_unique();

        {
            let raffle_info = raffle.info(true);
            let other_info = other.info(true);
            assert_eq!(
                pay_winner(&raffle_info, &other_info, &winner_key, 1_000, 50),
                Err(RaffleError::TransferFailed)
            );
        }

        assert_eq!(raffle.lamports, 1_050);
        assert_eq!(other.lamports, 5);
    }

    #[test]
    fn test_read_only_recipient_fails() {
        let program_id = Pubkey::new_unique();
        let mut raffle = TestAccount::new(1_050, program_id);
        let mut winner = TestAccount::new(5, system_program::id());
        let winner_key = winner.key;

        let raffle_info = raffle.info(true);
        let winner_info = winner.info(false);
        assert_eq!(
            pay_winner(&raffle_info, &winner_info, &winner_key, 1_000, 50),
            Err(RaffleError::TransferFailed)
        );
    }

    #[test]
    fn test_prize_may_not_touch_rent_reserve() {
        let program_id = Pubkey::new_unique();
        let mut raffle = TestAccount::new(1_000, program_id);
        let mut winner = TestAccount::new(0, system_program::id());
        let winner_key = winner.key;

        let raffle_info = raffle.info(true);
        let winner_info = winner.info(true);
        assert_eq!(
            pay_winner(&raffle_info, &winner_info, &winner_key, 1_000, 50),
            Err(RaffleError::TransferFailed)
        );
    }
}
