use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;

use crate::constants::*;
use crate::events::MessageStatusChanged;
use crate::processor::outbound;
use crate::state::{Attestation, BridgeConfig, MessageStatus, OutboundMessage, RelayerSet, Vault};
use crate::utils::lamports;
use crate::utils::signature::Ed25519SysvarVerifier;

pub fn mark_relayed(ctx: Context<MarkRelayed>, nonce: u64) -> Result<()> {
    outbound::mark_relayed(
        &ctx.accounts.relayers,
        &ctx.accounts.relayer.key(),
        &mut ctx.accounts.outbound,
    )?;
    status_changed(nonce, MessageStatus::Relayed);
    Ok(())
}

/// Finalize an outbound message once a quorum attests its delivery
pub fn confirm_delivery(ctx: Context<ConfirmDelivery>, nonce: u64, attestations: Vec<Attestation>) -> Result<()> {
    let verifier = Ed25519SysvarVerifier::load(&ctx.accounts.instructions.to_account_info())?;
    outbound::confirm_delivery(
        &mut ctx.accounts.bridge,
        &ctx.accounts.relayers,
        &mut ctx.accounts.outbound,
        &attestations,
        &verifier,
    )?;
    status_changed(nonce, MessageStatus::Confirmed);
    Ok(())
}

/// Refund the value of a message no relayer picked up
pub fn reclaim(ctx: Context<Reclaim>, nonce: u64) -> Result<()> {
    let refund = outbound::reclaim(
        &mut ctx.accounts.bridge,
        &mut ctx.accounts.outbound,
        &ctx.accounts.sender.key(),
        Clock::get()?.slot,
    )?;
    lamports::withdraw(
        &ctx.accounts.vault.to_account_info(),
        &ctx.accounts.sender.to_account_info(),
        refund,
    )?;

    msg!("Refunded {} lamports for nonce {}", refund, nonce);
    status_changed(nonce, MessageStatus::Failed);
    Ok(())
}

fn status_changed(nonce: u64, status: MessageStatus) {
    emit!(MessageStatusChanged { nonce, status });
    msg!("Outbound nonce={} is now {:?}", nonce, status);
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct MarkRelayed<'info> {
    #[account(seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(
        mut,
        seeds = [OUTBOUND_SEED, nonce.to_le_bytes().as_ref()],
        bump = outbound.bump
    )]
    pub outbound: Account<'info, OutboundMessage>,

    pub relayer: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct ConfirmDelivery<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    #[account(
        mut,
        seeds = [OUTBOUND_SEED, nonce.to_le_bytes().as_ref()],
        bump = outbound.bump
    )]
    pub outbound: Account<'info, OutboundMessage>,

    /// CHECK: instructions sysvar, read for Ed25519 verifications
    #[account(address = sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub submitter: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct Reclaim<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [OUTBOUND_SEED, nonce.to_le_bytes().as_ref()],
        bump = outbound.bump
    )]
    pub outbound: Account<'info, OutboundMessage>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub sender: Signer<'info>,
}
