use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::{AuthorityTransferred, ChainConfigured, ChainPauseUpdated, FeeScheduleUpdated, ThresholdUpdated};
use crate::processor::{admin, relayers};
use crate::state::{BridgeConfig, ChainConfig, ChainParams, FeeSchedule, RelayerSet};

pub fn configure_chain(ctx: Context<ConfigureChain>, chain_id: u32, params: ChainParams) -> Result<()> {
    let chain = &mut ctx.accounts.chain;
    admin::configure_chain(
        &*ctx.accounts.bridge,
        &ctx.accounts.authority.key(),
        chain,
        chain_id,
        &params,
    )?;
    chain.bump = ctx.bumps.chain;

    emit!(ChainConfigured { chain_id, params });

    msg!(
        "Chain {} configured: max_bytes={}, rate_limit={}, strict={}",
        chain_id,
        chain.max_message_bytes,
        chain.rate_limit_per_epoch,
        chain.strict_ordering
    );
    Ok(())
}

pub fn set_chain_active(ctx: Context<SetChainActive>, chain_id: u32, active: bool) -> Result<()> {
    let chain = &mut ctx.accounts.chain;
    admin::set_chain_active(&*ctx.accounts.bridge, &ctx.accounts.authority.key(), chain, active)?;

    emit!(ChainPauseUpdated { chain_id, active });

    msg!("Chain {} {}", chain_id, if active { "resumed" } else { "paused" });
    Ok(())
}

pub fn update_threshold(ctx: Context<UpdateThreshold>, required_signatures: u8) -> Result<()> {
    let relayer_set = &mut ctx.accounts.relayers;
    relayers::update_threshold(
        &*ctx.accounts.bridge,
        &ctx.accounts.authority.key(),
        relayer_set,
        required_signatures,
    )?;

    emit!(ThresholdUpdated {
        required_signatures,
        active_count: relayer_set.active_count,
    });

    msg!(
        "Threshold set to {} of {}",
        required_signatures,
        relayer_set.active_count
    );
    Ok(())
}

pub fn set_fee_schedule(ctx: Context<UpdateBridge>, fees: FeeSchedule) -> Result<()> {
    admin::set_fee_schedule(&mut ctx.accounts.bridge, &ctx.accounts.authority.key(), fees.clone())?;

    emit!(FeeScheduleUpdated { fees });

    msg!("Fee schedule updated");
    Ok(())
}

pub fn set_authority(ctx: Context<UpdateBridge>, new_authority: Pubkey) -> Result<()> {
    let previous = admin::set_authority(&mut ctx.accounts.bridge, &ctx.accounts.authority.key(), new_authority)?;

    emit!(AuthorityTransferred {
        previous,
        new_authority,
    });

    msg!("Authority transferred from {} to {}", previous, new_authority);
    Ok(())
}

#[derive(Accounts)]
#[instruction(chain_id: u32)]
pub struct ConfigureChain<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + ChainConfig::INIT_SPACE,
        seeds = [CHAIN_SEED, chain_id.to_le_bytes().as_ref()],
        bump
    )]
    pub chain: Account<'info, ChainConfig>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(chain_id: u32)]
pub struct SetChainActive<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHAIN_SEED, chain_id.to_le_bytes().as_ref()],
        bump = chain.bump
    )]
    pub chain: Account<'info, ChainConfig>,

    pub authority: Signer<'info>,
}

#[derive(Accounts)]
pub struct UpdateThreshold<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(mut, seeds = [RELAYERS_SEED], bump = relayers.bump)]
    pub relayers: Account<'info, RelayerSet>,

    pub authority: Signer<'info>,
}

#[derive(Accounts)]
pub struct UpdateBridge<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    pub authority: Signer<'info>,
}
