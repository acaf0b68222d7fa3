use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::BridgeError;
use crate::events::MessageSent;
use crate::processor::outbound::{self, FeeSource, SendRequest};
use crate::state::{BridgeConfig, ChainConfig, FeePayer, OutboundMessage, SponsorAccount, Vault};
use crate::utils::{hash::evm_address, lamports};

/// Queue a message; the sender pays fee and value into the vault
pub fn handler(
    ctx: Context<SendMessage>,
    destination_chain_id: u32,
    destination_address: [u8; 20],
    payload: Vec<u8>,
    value: u64,
    compute_budget: u64,
    max_fee: u64,
) -> Result<u64> {
    let request = SendRequest {
        destination_chain_id,
        destination_address,
        payload,
        value,
        compute_budget,
        max_fee,
    };
    let accounts = ctx.accounts;
    let message = outbound::queue_message(
        &mut accounts.bridge,
        &mut accounts.chain,
        accounts.sender.key(),
        request,
        FeeSource::Sender,
        Clock::get()?.slot,
    )?;

    let owed = message
        .fee
        .checked_add(message.value)
        .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?;
    lamports::deposit(
        accounts.sender.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.system_program.to_account_info(),
        owed,
    )?;

    Ok(store(&accounts.bridge, &accounts.chain, &mut accounts.outbound, ctx.bumps.outbound, message))
}

/// Queue a message whose fee is paid from a sponsor's prepaid balance
pub fn send_sponsored(
    ctx: Context<SendSponsored>,
    destination_chain_id: u32,
    destination_address: [u8; 20],
    payload: Vec<u8>,
    value: u64,
    compute_budget: u64,
    max_fee: u64,
) -> Result<u64> {
    let request = SendRequest {
        destination_chain_id,
        destination_address,
        payload,
        value,
        compute_budget,
        max_fee,
    };
    let accounts = ctx.accounts;
    let message = outbound::queue_message(
        &mut accounts.bridge,
        &mut accounts.chain,
        accounts.sender.key(),
        request,
        FeeSource::Sponsor(&mut *accounts.sponsor_account),
        Clock::get()?.slot,
    )?;

    lamports::deposit(
        accounts.sender.to_account_info(),
        accounts.vault.to_account_info(),
        accounts.system_program.to_account_info(),
        message.value,
    )?;

    msg!(
        "Sponsor {} paid {} lamports, balance {}",
        accounts.sponsor_account.sponsor,
        message.fee,
        accounts.sponsor_account.balance
    );

    Ok(store(&accounts.bridge, &accounts.chain, &mut accounts.outbound, ctx.bumps.outbound, message))
}

/// Relay fee for a message to `destination_chain_id`
pub fn estimate_fee(
    ctx: Context<EstimateFee>,
    _destination_chain_id: u32,
    payload_size: u32,
    compute_budget: u64,
) -> Result<u64> {
    outbound::estimate_fee(&ctx.accounts.bridge, &ctx.accounts.chain, payload_size as usize, compute_budget)
}

fn store(
    bridge: &BridgeConfig,
    chain: &ChainConfig,
    account: &mut Account<OutboundMessage>,
    bump: u8,
    mut message: OutboundMessage,
) -> u64 {
    message.bump = bump;
    let nonce = message.nonce;

    emit!(MessageSent {
        nonce,
        host_chain_id: bridge.host_chain_id,
        contract_identity: bridge.contract_identity,
        destination_chain_id: message.destination_chain_id,
        sender: message.sender,
        source_sender: evm_address(&message.sender),
        destination_address: message.destination_address,
        payload: message.payload.clone(),
        value: message.value,
        compute_budget: message.compute_budget,
        fee: message.fee,
        fee_payer: message.fee_payer,
        confirmations: chain.confirmations,
        created_at: message.created_at,
    });

    msg!(
        "Message sent: nonce={}, dest_chain={}, fee={}, payer={}",
        nonce,
        message.destination_chain_id,
        message.fee,
        if message.fee_payer == FeePayer::Sender { "sender" } else { "sponsor" }
    );

    account.set_inner(message);
    nonce
}

#[derive(Accounts)]
#[instruction(destination_chain_id: u32, destination_address: [u8; 20], payload: Vec<u8>)]
pub struct SendMessage<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHAIN_SEED, destination_chain_id.to_le_bytes().as_ref()],
        bump = chain.bump
    )]
    pub chain: Account<'info, ChainConfig>,

    #[account(
        init,
        payer = sender,
        space = OutboundMessage::space(payload.len()),
        seeds = [OUTBOUND_SEED, bridge.next_nonce.to_le_bytes().as_ref()],
        bump
    )]
    pub outbound: Account<'info, OutboundMessage>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub sender: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(destination_chain_id: u32, destination_address: [u8; 20], payload: Vec<u8>)]
pub struct SendSponsored<'info> {
    #[account(mut, seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        mut,
        seeds = [CHAIN_SEED, destination_chain_id.to_le_bytes().as_ref()],
        bump = chain.bump
    )]
    pub chain: Account<'info, ChainConfig>,

    #[account(
        init,
        payer = sender,
        space = OutboundMessage::space(payload.len()),
        seeds = [OUTBOUND_SEED, bridge.next_nonce.to_le_bytes().as_ref()],
        bump
    )]
    pub outbound: Account<'info, OutboundMessage>,

    #[account(
        mut,
        seeds = [SPONSOR_SEED, sponsor_account.sponsor.as_ref()],
        bump = sponsor_account.bump
    )]
    pub sponsor_account: Account<'info, SponsorAccount>,

    #[account(mut, seeds = [VAULT_SEED], bump = bridge.vault_bump)]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub sender: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(destination_chain_id: u32)]
pub struct EstimateFee<'info> {
    #[account(seeds = [BRIDGE_SEED], bump = bridge.bump)]
    pub bridge: Account<'info, BridgeConfig>,

    #[account(
        seeds = [CHAIN_SEED, destination_chain_id.to_le_bytes().as_ref()],
        bump = chain.bump
    )]
    pub chain: Account<'info, ChainConfig>,
}
