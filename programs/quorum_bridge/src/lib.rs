use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod processor;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_utils;

use instructions::*;
use state::{Attestation, BridgeParams, ChainParams, FeeSchedule, InboundMessage};

declare_id!("Eq7s4Qx4qg8duZkmreBCo1Ds7EFHBux7yK8fP7NziVqs");

/// Quorum Bridge Program
///
/// Cross-chain message relay secured by an M-of-N quorum of staked relayers,
/// with per-chain rate limits, a fee ledger and sponsored sends
#[program]
pub mod quorum_bridge {
    use super::*;

    /// Create the bridge, vault and empty relayer set
    pub fn initialize(ctx: Context<InitializeBridge>, params: BridgeParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    // Chain registry

    /// Create or update a chain (authority only)
    pub fn configure_chain(ctx: Context<ConfigureChain>, chain_id: u32, params: ChainParams) -> Result<()> {
        instructions::admin::configure_chain(ctx, chain_id, params)
    }

    /// Pause or resume a chain in both directions (authority only)
    pub fn set_chain_active(ctx: Context<SetChainActive>, chain_id: u32, active: bool) -> Result<()> {
        instructions::admin::set_chain_active(ctx, chain_id, active)
    }

    // Outbound

    /// Queue a message to another chain, returns its nonce
    pub fn send_message(
        ctx: Context<SendMessage>,
        destination_chain_id: u32,
        destination_address: [u8; 20],
        payload: Vec<u8>,
        value: u64,
        compute_budget: u64,
        max_fee: u64,
    ) -> Result<u64> {
        instructions::send_message::handler(
            ctx,
            destination_chain_id,
            destination_address,
            payload,
            value,
            compute_budget,
            max_fee,
        )
    }

    /// Queue a message whose fee a sponsor pays, returns its nonce
    pub fn send_sponsored(
        ctx: Context<SendSponsored>,
        destination_chain_id: u32,
        destination_address: [u8; 20],
        payload: Vec<u8>,
        value: u64,
        compute_budget: u64,
        max_fee: u64,
    ) -> Result<u64> {
        instructions::send_message::send_sponsored(
            ctx,
            destination_chain_id,
            destination_address,
            payload,
            value,
            compute_budget,
            max_fee,
        )
    }

    pub fn estimate_fee(
        ctx: Context<EstimateFee>,
        destination_chain_id: u32,
        payload_size: u32,
        compute_budget: u64,
    ) -> Result<u64> {
        instructions::send_message::estimate_fee(ctx, destination_chain_id, payload_size, compute_budget)
    }

    pub fn mark_relayed(ctx: Context<MarkRelayed>, nonce: u64) -> Result<()> {
        instructions::outbound_status::mark_relayed(ctx, nonce)
    }

    pub fn confirm_delivery(
        ctx: Context<ConfirmDelivery>,
        nonce: u64,
        attestations: Vec<Attestation>,
    ) -> Result<()> {
        instructions::outbound_status::confirm_delivery(ctx, nonce, attestations)
    }

    pub fn reclaim(ctx: Context<Reclaim>, nonce: u64) -> Result<()> {
        instructions::outbound_status::reclaim(ctx, nonce)
    }

    // Inbound

    /// Verify a quorum attestation and execute one inbound message
    pub fn process_message<'info>(
        ctx: Context<'_, '_, 'info, 'info, ProcessMessage<'info>>,
        digest: [u8; 32],
        message: InboundMessage,
        attestations: Vec<Attestation>,
    ) -> Result<()> {
        instructions::process_message::handler(ctx, digest, message, attestations)
    }

    /// Verify one quorum over a batch digest and execute every new member
    pub fn process_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, ProcessBatch<'info>>,
        messages: Vec<InboundMessage>,
        attestations: Vec<Attestation>,
        extra_accounts: Vec<u8>,
    ) -> Result<()> {
        instructions::process_batch::handler(ctx, messages, attestations, extra_accounts)
    }

    pub fn open_receipt(ctx: Context<OpenReceipt>, digest: [u8; 32]) -> Result<()> {
        instructions::receipts::open_receipt(ctx, digest)
    }

    pub fn open_cursor(ctx: Context<OpenCursor>, source_chain_id: u32, source_sender: Vec<u8>) -> Result<()> {
        instructions::receipts::open_cursor(ctx, source_chain_id, source_sender)
    }

    // Relayers

    /// Register a relayer, co-signed by the authority
    pub fn register_relayer(ctx: Context<RegisterRelayer>, public_key: [u8; 32], stake: u64) -> Result<()> {
        instructions::relayer::register_relayer(ctx, public_key, stake)
    }

    pub fn unregister_relayer(ctx: Context<UnregisterRelayer>, index: u8) -> Result<()> {
        instructions::relayer::unregister_relayer(ctx, index)
    }

    /// Evict a relayer (authority only)
    pub fn remove_relayer(ctx: Context<RemoveRelayer>, index: u8) -> Result<()> {
        instructions::relayer::remove_relayer(ctx, index)
    }

    /// Change the signature threshold M (authority only)
    pub fn update_threshold(ctx: Context<UpdateThreshold>, required_signatures: u8) -> Result<()> {
        instructions::admin::update_threshold(ctx, required_signatures)
    }

    pub fn claim_compensation(ctx: Context<ClaimCompensation>, index: u8, amount: u64) -> Result<()> {
        instructions::relayer::claim_compensation(ctx, index, amount)
    }

    // Fees and sponsors

    pub fn set_fee_schedule(ctx: Context<UpdateBridge>, fees: FeeSchedule) -> Result<()> {
        instructions::admin::set_fee_schedule(ctx, fees)
    }

    /// Hand the governing authority to a new key (authority only)
    pub fn set_authority(ctx: Context<UpdateBridge>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::set_authority(ctx, new_authority)
    }

    pub fn open_sponsor(ctx: Context<OpenSponsor>) -> Result<()> {
        instructions::sponsor::open_sponsor(ctx)
    }

    pub fn deposit_sponsor(ctx: Context<FundSponsor>, amount: u64) -> Result<()> {
        instructions::sponsor::deposit_sponsor(ctx, amount)
    }

    pub fn withdraw_sponsor(ctx: Context<FundSponsor>, amount: u64) -> Result<()> {
        instructions::sponsor::withdraw_sponsor(ctx, amount)
    }

    pub fn set_sponsored_target(
        ctx: Context<SetSponsoredTarget>,
        chain_id: u32,
        address: [u8; 20],
        allowed: bool,
    ) -> Result<()> {
        instructions::sponsor::set_sponsored_target(ctx, chain_id, address, allowed)
    }
}
