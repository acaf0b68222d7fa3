use anchor_lang::prelude::*;

use crate::constants::{FEE_MULTIPLIER_DENOMINATOR, MAX_PAYLOAD_BYTES};
use crate::errors::BridgeError;
use crate::state::{BridgeConfig, ChainConfig, ChainParams, FeeSchedule, GoverningAuthority};

/// Create or update a chain registry entry
pub fn configure_chain<A: GoverningAuthority>(
    authority: &A,
    actor: &Pubkey,
    chain: &mut ChainConfig,
    chain_id: u32,
    params: &ChainParams,
) -> Result<()> {
    authority.ensure_authorized(actor)?;
    require!(
        chain.chain_id == 0 || chain.chain_id == chain_id,
        BridgeError::ChainMismatch
    );
    chain.apply(chain_id, params)
}

/// Pause or resume traffic in both directions
pub fn set_chain_active<A: GoverningAuthority>(
    authority: &A,
    actor: &Pubkey,
    chain: &mut ChainConfig,
    active: bool,
) -> Result<()> {
    authority.ensure_authorized(actor)?;
    chain.active = active;
    Ok(())
}

pub fn set_fee_schedule(bridge: &mut BridgeConfig, actor: &Pubkey, fees: FeeSchedule) -> Result<()> {
    bridge.ensure_authorized(actor)?;
    // Probe for overflow at the largest message the bridge accepts
    fees.estimate(FEE_MULTIPLIER_DENOMINATOR as u32, MAX_PAYLOAD_BYTES as usize, 0)?;
    bridge.fees = fees;
    Ok(())
}

/// Hand the governing capability to a new key, such as a governance PDA
pub fn set_authority(bridge: &mut BridgeConfig, actor: &Pubkey, new_authority: Pubkey) -> Result<Pubkey> {
    bridge.ensure_authorized(actor)?;
    let previous = bridge.authority;
    bridge.authority = new_authority;
    Ok(previous)
}
