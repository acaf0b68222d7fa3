use anchor_lang::prelude::*;

use crate::constants::MAX_PAYLOAD_BYTES;
use crate::errors::BridgeError;

/// Registry entry describing the transport limits of a remote chain
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct ChainConfig {
    /// Remote chain identifier
    pub chain_id: u32,

    /// Source-chain blocks a relayer waits before attesting
    pub confirmations: u32,

    pub max_message_bytes: u32,
    pub max_compute_budget: u64,

    /// Paused chains accept neither outbound nor inbound messages
    pub active: bool,

    /// Fee multiplier in basis points
    pub fee_multiplier_bps: u32,

    /// Messages admitted per direction per epoch
    pub rate_limit_per_epoch: u32,

    /// Enforce increasing source nonces per sender
    pub strict_ordering: bool,

    pub outbound_window: RateWindow,
    pub inbound_window: RateWindow,

    /// Highest source nonce processed from this chain
    pub highest_inbound_nonce: u64,

    pub bump: u8,
}

/// Authority-supplied chain settings
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChainParams {
    pub confirmations: u32,
    pub max_message_bytes: u32,
    pub max_compute_budget: u64,
    pub fee_multiplier_bps: u32,
    pub rate_limit_per_epoch: u32,
    pub strict_ordering: bool,
}

impl ChainParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.confirmations >= 1, BridgeError::InvalidChainConfig);
        require!(
            self.max_message_bytes > 0 && self.max_message_bytes <= MAX_PAYLOAD_BYTES,
            BridgeError::InvalidChainConfig
        );
        require!(self.fee_multiplier_bps > 0, BridgeError::InvalidChainConfig);
        require!(self.rate_limit_per_epoch > 0, BridgeError::InvalidChainConfig);
        Ok(())
    }
}

impl ChainConfig {
    /// Create or overwrite the chain's limits. Rate windows and the nonce
    /// high-water mark survive an update; a new entry starts active.
    pub fn apply(&mut self, chain_id: u32, params: &ChainParams) -> Result<()> {
        require!(chain_id > 0, BridgeError::InvalidChainConfig);
        params.validate()?;

        let is_new = self.chain_id == 0;
        self.chain_id = chain_id;
        self.confirmations = params.confirmations;
        self.max_message_bytes = params.max_message_bytes;
        self.max_compute_budget = params.max_compute_budget;
        self.fee_multiplier_bps = params.fee_multiplier_bps;
        self.rate_limit_per_epoch = params.rate_limit_per_epoch;
        self.strict_ordering = params.strict_ordering;
        if is_new {
            self.active = true;
        }
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<()> {
        require!(self.active, BridgeError::ChainPaused);
        Ok(())
    }

    /// Transport limits shared by both directions
    pub fn check_limits(&self, payload_len: usize, compute_budget: u64) -> Result<()> {
        require!(
            payload_len <= self.max_message_bytes as usize,
            BridgeError::MessageTooLarge
        );
        require!(
            compute_budget <= self.max_compute_budget,
            BridgeError::ComputeBudgetExceeded
        );
        Ok(())
    }

    pub fn record_inbound_nonce(&mut self, nonce: u64) {
        if nonce > self.highest_inbound_nonce {
            self.highest_inbound_nonce = nonce;
        }
    }
}

/// Fixed-window counter. Up to twice the limit can pass around a window edge.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateWindow {
    pub epoch_start: u64,
    pub count_in_epoch: u32,
}

impl RateWindow {
    /// Window state after admitting `count` more messages at slot `now`.
    /// Does not mutate, so callers commit only once every other check passed.
    pub fn admit(&self, now: u64, epoch_length: u64, limit: u32, count: u32) -> Result<RateWindow> {
        let rolled_over = now >= self.epoch_start.saturating_add(epoch_length);
        let current = if rolled_over {
            RateWindow {
                epoch_start: now,
                count_in_epoch: 0,
            }
        } else {
            *self
        };

        let next = current
            .count_in_epoch
            .checked_add(count)
            .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?;
        require!(next <= limit, BridgeError::RateLimited);

        Ok(RateWindow {
            epoch_start: current.epoch_start,
            count_in_epoch: next,
        })
    }
}
