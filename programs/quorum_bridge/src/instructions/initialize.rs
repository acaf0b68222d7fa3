use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{BridgeConfig, BridgeParams, RelayerSet, Vault};
use crate::utils::hash::evm_address;

pub fn handler(ctx: Context<InitializeBridge>, params: BridgeParams) -> Result<()> {
    let contract_identity = evm_address(&crate::ID);
    let mut config = BridgeConfig::new(ctx.accounts.authority.key(), contract_identity, &params)?;
    config.vault_bump = ctx.bumps.vault;
    config.executor_bump = ctx.bumps.executor;
    config.bump = ctx.bumps.bridge;
    ctx.accounts.bridge.set_inner(config);

    ctx.accounts.vault.bump = ctx.bumps.vault;
    ctx.accounts.relayers.bump = ctx.bumps.relayers;

    msg!(
        "Bridge initialized for host chain {} with identity {:?}",
        params.host_chain_id,
        contract_identity
    );
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeBridge<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + BridgeConfig::INIT_SPACE,
        seeds = [BRIDGE_SEED],
        bump
    )]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        init,
        payer = authority,
        space = 8 + Vault::INIT_SPACE,
        seeds = [VAULT_SEED],
        bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        init,
        payer = authority,
        space = 8 + RelayerSet::INIT_SPACE,
        seeds = [RELAYERS_SEED],
        bump
    )]
    pub relayers: Account<'info, RelayerSet>,

    /// CHECK: signs destination calls; holds no data
    #[account(seeds = [EXECUTOR_SEED], bump)]
    pub executor: UncheckedAccount<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}
