use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::errors::BridgeError;

/// Move lamports from a signer into the vault
pub fn deposit<'info>(
    from: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    let cpi_ctx = CpiContext::new(system_program, Transfer { from, to: vault });
    transfer(cpi_ctx, amount)
}

/// Lamports the vault holds above its rent-exempt minimum
pub fn spendable(vault: &AccountInfo) -> Result<u64> {
    let floor = Rent::get()?.minimum_balance(vault.data_len());
    Ok(vault.lamports().saturating_sub(floor))
}

/// Debit the program-owned vault directly; the system program cannot move
/// lamports out of an account carrying data.
pub fn withdraw(vault: &AccountInfo, to: &AccountInfo, amount: u64) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    require!(amount <= spendable(vault)?, BridgeError::InsufficientLiquidity);

    let credited = to
        .lamports()
        .checked_add(amount)
        .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?;
    **vault.try_borrow_mut_lamports()? -= amount;
    **to.try_borrow_mut_lamports()? = credited;
    Ok(())
}
