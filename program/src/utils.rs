// Account checks and lamport helpers shared by the processor
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::error::RaffleError;

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}

pub fn assert_signer(account: &AccountInfo, role: &str) -> ProgramResult {
    if !account.is_signer {
        msg!("{} must sign the transaction", role);
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

pub fn assert_owned_by(account: &AccountInfo, owner: &Pubkey, role: &str) -> ProgramResult {
    if account.owner != owner {
        msg!("{} account must be owned by this program", role);
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

pub fn assert_writable(account: &AccountInfo, role: &str) -> ProgramResult {
    if !account.is_writable {
        msg!("{} account must be writable", role);
        return Err(ProgramError::InvalidArgument);
    }
    Ok(())
}

/// Moves lamports out of a program-owned account. Both balances are
/// computed before either is written.
pub fn transfer_lamports(
    from: &AccountInfo,
    to: &AccountInfo,
    amount: u64,
) -> Result<(), RaffleError> {
    let remaining = from
        .lamports()
        .checked_sub(amount)
        .ok_or(RaffleError::PayoutFailed)?;
    let credited = to
        .lamports()
        .checked_add(amount)
        .ok_or(RaffleError::PayoutFailed)?;

    **from
        .try_borrow_mut_lamports()
        .map_err(|_| RaffleError::PayoutFailed)? = remaining;
    **to
        .try_borrow_mut_lamports()
        .map_err(|_| RaffleError::PayoutFailed)? = credited;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_lamports_for_display() {
        assert_eq!(lamports_to_sol(10_000_000), 0.01);
        assert_eq!(lamports_to_sol(1_000_000_000), 1.0);
    }

    #[test]
    fn transfer_moves_exact_amount() {
        let owner = Pubkey::new_unique();
        let (from_key, to_key) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (mut from_lamports, mut to_lamports) = (100u64, 5u64);
        let (mut from_data, mut to_data) = ([0u8; 0], [0u8; 0]);
        let from = AccountInfo::new(
            &from_key, false, true, &mut from_lamports, &mut from_data, &owner, false, 0,
        );
        let to = AccountInfo::new(
            &to_key, false, true, &mut to_lamports, &mut to_data, &owner, false, 0,
        );

        transfer_lamports(&from, &to, 60).unwrap();
        assert_eq!(from.lamports(), 40);
        assert_eq!(to.lamports(), 65);

        assert_eq!(
            transfer_lamports(&from, &to, 41),
            Err(RaffleError::PayoutFailed)
        );
        assert_eq!(from.lamports(), 40);
        assert_eq!(to.lamports(), 65);
    }
}
