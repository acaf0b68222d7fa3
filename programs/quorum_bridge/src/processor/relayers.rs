use anchor_lang::prelude::*;

use crate::errors::BridgeError;
use crate::state::{bridge::checked_add, BridgeConfig, GoverningAuthority, RelayerEntry, RelayerSet};

/// Lamports owed to a relayer leaving the set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub index: u8,
    pub entry: RelayerEntry,
    /// Stake plus unclaimed earnings the pool can still cover
    pub payout: u64,
}

/// Admit a staked relayer. The governing authority co-signs every registration.
pub fn register_relayer<A: GoverningAuthority>(
    authority: &A,
    actor: &Pubkey,
    bridge: &BridgeConfig,
    relayers: &mut RelayerSet,
    owner: Pubkey,
    public_key: [u8; 32],
    stake: u64,
    now: u64,
) -> Result<u8> {
    authority.ensure_authorized(actor)?;
    relayers.register(owner, public_key, stake, bridge.minimum_stake, now)
}

/// Owner-initiated exit
pub fn unregister_relayer(
    bridge: &mut BridgeConfig,
    relayers: &mut RelayerSet,
    index: u8,
    caller: &Pubkey,
) -> Result<Departure> {
    let entry = relayers.unregister(index, caller)?;
    settle(bridge, index, entry)
}

/// Authority-initiated removal; the stake goes back to the owner
pub fn remove_relayer(
    bridge: &mut BridgeConfig,
    actor: &Pubkey,
    relayers: &mut RelayerSet,
    index: u8,
) -> Result<Departure> {
    bridge.ensure_authorized(actor)?;
    let entry = relayers.remove(index)?;
    settle(bridge, index, entry)
}

pub fn update_threshold<A: GoverningAuthority>(
    authority: &A,
    actor: &Pubkey,
    relayers: &mut RelayerSet,
    required_signatures: u8,
) -> Result<()> {
    authority.ensure_authorized(actor)?;
    relayers.set_threshold(required_signatures)
}

/// Withdraw earned compensation, bounded by both the relayer's earnings and the pool
pub fn claim_compensation(
    bridge: &mut BridgeConfig,
    relayers: &mut RelayerSet,
    index: u8,
    caller: &Pubkey,
    amount: u64,
) -> Result<()> {
    require!(
        amount <= bridge.relayer_pool,
        BridgeError::InsufficientPoolBalance
    );
    relayers.debit_earnings(index, caller, amount)?;
    bridge.pay_compensation(amount)
}

// Earnings the pool cannot cover are forfeited
fn settle(bridge: &mut BridgeConfig, index: u8, entry: RelayerEntry) -> Result<Departure> {
    let earnings = entry.earned.min(bridge.relayer_pool);
    bridge.pay_compensation(earnings)?;
    let payout = checked_add(entry.stake, earnings)?;
    Ok(Departure {
        index,
        entry,
        payout,
    })
}
