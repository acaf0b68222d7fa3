use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::SponsorBalanceChanged;
use crate::state::{BridgeConfig, SponsorAccount, SponsoredTarget, Vault};
use crate::utils::lamports;

pub fn open_sponsor(ctx: Context<OpenSponsor>) -> Result<()> {
    let account = &mut ctx.accounts.sponsor_account;
    account.sponsor = ctx.accounts.sponsor.key();
    account.bump = ctx.bumps.sponsor_account;

    msg!("Sponsor account opened for {}", account.sponsor);
    Ok(())
}

/// Prepay relay fees into the vault
pub fn deposit_sponsor(ctx: Context<FundSponsor>, amount: u64) -> Result<()> {
    let accounts = ctx.accounts;
    accounts.sponsor_account.deposit(amount)?;
    accounts.bridge.hold_sponsor_funds(amount)?;
    lamports::deposit(
        accounts.sponsor.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.system_program.to_account_info(),
        amount,
    )?;

    balance_changed(&accounts.sponsor_account);
    Ok(())
}

/// Withdraw unspent prepaid fees
pub fn withdraw_sponsor(ctx: Context<FundSponsor>, amount: u64) -> Result<()> {
    let accounts = ctx.accounts;
    accounts.sponsor_account.withdraw(amount)?;
    accounts.bridge.release_sponsor_funds(amount)?;
    lamports::withdraw(
        &accounts.vault.to_account_info(),
        &accounts.sponsor.to_account_info(),
        amount,
    )?;

    balance_changed(&accounts.sponsor_account);
    Ok(())
}

pub fn set_sponsored_target(
    ctx: Context<SetSponsoredTarget>,
    chain_id: u32,
    address: [u8; 20],
    allowed: bool,
) -> Result<()> {
    let account = &mut ctx.accounts.sponsor_account;
    account.set_target(SponsoredTarget { chain_id, address }, allowed)?;

    msg!(
        "Sponsor {} {} chain {} target, {} targets",
        account.sponsor,
        if allowed { "allowed" } else { "removed" },
        chain_id,
        account.allowed_targets.len()
    );
    Ok(())
}

fn balance_changed(account: &SponsorAccount) {
    emit!(SponsorBalanceChanged {
        sponsor: account.sponsor,
        balance: account.balance,
    });
    msg!("Sponsor {} balance: {}", account.sponsor, account.balance);
}

#[derive(Accounts)]
pub struct OpenSponsor<'info> {
    #[account(
        init,
        payer = sponsor,
        space = 8 + SponsorAccount::INIT_SPACE,
        seeds = [SPONSOR_SEED, sponsor.key().as_ref()],
        bump
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    #[account(mut)]
    pub sponsor: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundSponsor<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [SPONSOR_SEED, sponsor.key().as_ref()],
        bump = sponsor_account.bump,
        has_one = sponsor
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub sponsor: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetSponsoredTarget<'info> {
    #[account(
        mut,
        seeds = [SPONSOR_SEED, sponsor.key().as_ref()],
        bump = sponsor_account.bump,
        has_one = sponsor
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    pub sponsor: Signer<'info>,
}
