use anchor_lang::prelude::*;

use crate::errors::BridgeError;
use crate::state::{
    Attestation, BridgeConfig, ChainConfig, FeePayer, MessageStatus, OutboundMessage, RelayerSet,
    SponsorAccount, SponsoredTarget,
};
use crate::utils::hash::confirmation_digest;
use crate::utils::signature::{require_quorum, SignatureVerifier};

/// Caller-supplied fields of an outbound message
#[derive(Clone, Debug)]
pub struct SendRequest {
    pub destination_chain_id: u32,
    pub destination_address: [u8; 20],
    pub payload: Vec<u8>,
    pub value: u64,
    pub compute_budget: u64,
    /// Highest fee the caller accepts
    pub max_fee: u64,
}

/// Who pays the relay fee
pub enum FeeSource<'a> {
    Sender,
    Sponsor(&'a mut SponsorAccount),
}

/// Relay fee for a message to `chain`
pub fn estimate_fee(
    bridge: &BridgeConfig,
    chain: &ChainConfig,
    payload_size: usize,
    compute_budget: u64,
) -> Result<u64> {
    bridge
        .fees
        .estimate(chain.fee_multiplier_bps, payload_size, compute_budget)
}

/// Validate and queue an outbound message.
///
/// Checks run in order: chain active, payload size, compute budget, rate
/// limit, fee. Nothing changes unless every check passes. The returned
/// message carries the allocated nonce and the fee charged.
pub fn queue_message(
    bridge: &mut BridgeConfig,
    chain: &mut ChainConfig,
    sender: Pubkey,
    request: SendRequest,
    fee_source: FeeSource,
    now: u64,
) -> Result<OutboundMessage> {
    require!(
        chain.chain_id == request.destination_chain_id,
        BridgeError::ChainMismatch
    );
    chain.ensure_active()?;
    chain.check_limits(request.payload.len(), request.compute_budget)?;

    let window = chain.outbound_window.admit(
        now,
        bridge.rate_epoch_length,
        chain.rate_limit_per_epoch,
        1,
    )?;

    let fee = estimate_fee(bridge, chain, request.payload.len(), request.compute_budget)?;
    require!(fee <= request.max_fee, BridgeError::InsufficientFee);

    let target = SponsoredTarget {
        chain_id: request.destination_chain_id,
        address: request.destination_address,
    };
    if let FeeSource::Sponsor(account) = &fee_source {
        account.ensure_can_pay(&target, fee)?;
    }

    // Commit
    let sponsored = matches!(fee_source, FeeSource::Sponsor(_));
    let nonce = bridge.record_send(fee, request.value, sponsored)?;
    chain.outbound_window = window;
    let fee_payer = match fee_source {
        FeeSource::Sender => FeePayer::Sender,
        FeeSource::Sponsor(account) => {
            account.spend(&target, fee)?;
            FeePayer::Sponsor(account.sponsor)
        }
    };

    Ok(OutboundMessage {
        nonce,
        destination_chain_id: request.destination_chain_id,
        sender,
        destination_address: request.destination_address,
        payload: request.payload,
        value: request.value,
        compute_budget: request.compute_budget,
        fee,
        fee_payer,
        created_at: now,
        status: MessageStatus::Queued,
        bump: 0,
    })
}

/// A registered relayer reports that it picked the message up
pub fn mark_relayed(relayers: &RelayerSet, caller: &Pubkey, message: &mut OutboundMessage) -> Result<()> {
    require!(
        relayers.index_of_owner(caller).is_some(),
        BridgeError::UnknownRelayer
    );
    message.mark_relayed()
}

/// Finalize a message once a quorum attests delivery on the destination chain
pub fn confirm_delivery<V: SignatureVerifier>(
    bridge: &mut BridgeConfig,
    relayers: &RelayerSet,
    message: &mut OutboundMessage,
    attestations: &[Attestation],
    verifier: &V,
) -> Result<[u8; 32]> {
    let digest = confirmation_digest(
        bridge.host_chain_id,
        &bridge.contract_identity,
        message.destination_chain_id,
        message.nonce,
    );
    require_quorum(relayers, &digest, attestations, verifier)?;

    message.confirm()?;
    bridge.release_value(message.value)?;
    Ok(digest)
}

/// Fail a stale queued message; returns the value to refund to the sender.
/// The fee is not refunded and the nonce stays consumed.
pub fn reclaim(bridge: &mut BridgeConfig, message: &mut OutboundMessage, caller: &Pubkey, now: u64) -> Result<u64> {
    let value = message.reclaim(caller, now, bridge.reclaim_after)?;
    bridge.release_value(value)?;
    Ok(value)
}
