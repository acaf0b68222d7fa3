use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::{CompensationClaimed, RelayerRegistered, RelayerUnregistered};
use crate::processor::relayers::{self, Departure};
use crate::state::{BridgeConfig, RelayerSet, Vault};
use crate::utils::lamports;

/// Register a relayer; the governing authority co-signs and the owner stakes
pub fn register_relayer(ctx: Context<RegisterRelayer>, public_key: [u8; 32], stake: u64) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let index = relayers::register_relayer(
        &*ctx.accounts.bridge,
        &ctx.accounts.authority.key(),
        &ctx.accounts.bridge,
        &mut ctx.accounts.relayers,
        owner,
        public_key,
        stake,
        Clock::get()?.slot,
    )?;

    lamports::deposit(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        stake,
    )?;

    emit!(RelayerRegistered {
        index,
        owner,
        public_key,
        stake,
    });

    msg!(
        "Relayer {} registered at index {} (N={}, M={})",
        owner,
        index,
        ctx.accounts.relayers.active_count,
        ctx.accounts.relayers.required_signatures
    );
    Ok(())
}

/// Owner withdraws its relayer and stake
pub fn unregister_relayer(ctx: Context<UnregisterRelayer>, index: u8) -> Result<()> {
    let departure = relayers::unregister_relayer(
        &mut ctx.accounts.bridge,
        &mut ctx.accounts.relayers,
        index,
        &ctx.accounts.owner.key(),
    )?;
    pay_out(&ctx.accounts.vault, &ctx.accounts.owner.to_account_info(), &departure)
}

/// Authority evicts a relayer; the stake is returned to its owner
pub fn remove_relayer(ctx: Context<RemoveRelayer>, index: u8) -> Result<()> {
    let departure = relayers::remove_relayer(
        &mut ctx.accounts.bridge,
        &ctx.accounts.authority.key(),
        &mut ctx.accounts.relayers,
        index,
    )?;
    require_keys_eq!(
        departure.entry.owner,
        ctx.accounts.owner.key(),
        BridgeError::NotRelayerOwner
    );
    pay_out(&ctx.accounts.vault, &ctx.accounts.owner.to_account_info(), &departure)
}

pub fn claim_compensation(ctx: Context<ClaimCompensation>, index: u8, amount: u64) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    relayers::claim_compensation(
        &mut ctx.accounts.bridge,
        &mut ctx.accounts.relayers,
        index,
        &owner,
        amount,
    )?;
    lamports::withdraw(
        &ctx.accounts.vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        amount,
    )?;

    emit!(CompensationClaimed { index, owner, amount });

    msg!("Relayer {} claimed {} lamports", index, amount);
    Ok(())
}

fn pay_out(vault: &Account<Vault>, owner: &AccountInfo, departure: &Departure) -> Result<()> {
    lamports::withdraw(&vault.to_account_info(), owner, departure.payout)?;

    emit!(RelayerUnregistered {
        index: departure.index,
        owner: departure.entry.owner,
        payout: departure.payout,
    });

    msg!(
        "Relayer {} left index {}, paid out {} lamports",
        departure.entry.owner,
        departure.index,
        departure.payout
    );
    Ok(())
}

#[derive(Accounts)]
pub struct RegisterRelayer<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UnregisterRelayer<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub owner: Signer<'info>,
}

#[derive(Accounts)]
pub struct RemoveRelayer<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    /// CHECK: must match the removed relayer's owner, checked in the handler
    #[account(mut)]
    pub owner: UncheckedAccount<'info>,

    pub authority: Signer<'info>,
}

#[derive(Accounts)]
pub struct ClaimCompensation<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub owner: Signer<'info>,
}
