use anchor_lang::prelude::*;

use crate::constants::FEE_MULTIPLIER_DENOMINATOR;
use crate::errors::BridgeError;

/// Relay fee parameters, all in lamports
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    pub base_fee: u64,
    pub per_byte_fee: u64,
    pub per_compute_unit_fee: u64,
    /// Earned by a registered relayer for each inbound message it lands
    pub relay_reward: u64,
}

impl FeeSchedule {
    /// Fee for relaying a message of `payload_size` bytes with `compute_budget`
    /// units, scaled by the destination chain's multiplier.
    pub fn estimate(&self, fee_multiplier_bps: u32, payload_size: usize, compute_budget: u64) -> Result<u64> {
        let overflow = || error!(BridgeError::ArithmeticOverflow);

        let size_fee = self
            .per_byte_fee
            .checked_mul(payload_size as u64)
            .ok_or_else(overflow)?;
        let compute_fee = self
            .per_compute_unit_fee
            .checked_mul(compute_budget)
            .ok_or_else(overflow)?;
        let raw = self
            .base_fee
            .checked_add(size_fee)
            .and_then(|fee| fee.checked_add(compute_fee))
            .ok_or_else(overflow)?;

        let scaled = (raw as u128)
            .checked_mul(fee_multiplier_bps as u128)
            .ok_or_else(overflow)?
            / FEE_MULTIPLIER_DENOMINATOR as u128;
        u64::try_from(scaled).map_err(|_| overflow())
    }
}
