use anchor_lang::prelude::*;

use crate::errors::BridgeError;
use crate::state::FeeSchedule;

/// Main bridge account storing configuration, the outbound nonce and the fee ledger
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct BridgeConfig {
    /// Governing authority; may be a multisig or governance PDA
    pub authority: Pubkey,

    /// Chain identifier of this host, bound into every digest
    pub host_chain_id: u32,

    /// 20-byte identity of this program, bound into every digest
    pub contract_identity: [u8; 20],

    /// Next outbound nonce, never reused
    pub next_nonce: u64,

    pub fees: FeeSchedule,

    /// Rate limiter window length in slots
    pub rate_epoch_length: u64,

    /// Minimum lamports a relayer must stake
    pub minimum_stake: u64,

    /// Slots after which a queued outbound message can be reclaimed
    pub reclaim_after: u64,

    /// Lamports available for relayer compensation
    pub relayer_pool: u64,

    pub total_fees_collected: u64,
    pub total_compensation_claimed: u64,

    /// Outbound value held in the vault until confirmed or reclaimed
    pub locked_value: u64,

    /// Sum of all sponsor balances held in the vault
    pub sponsor_funds: u64,

    pub vault_bump: u8,
    pub executor_bump: u8,
    pub bump: u8,
}

/// Parameters supplied at initialization
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct BridgeParams {
    pub host_chain_id: u32,
    pub fees: FeeSchedule,
    pub rate_epoch_length: u64,
    pub minimum_stake: u64,
    pub reclaim_after: u64,
}

impl BridgeParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.host_chain_id > 0, BridgeError::InvalidBridgeParams);
        require!(self.rate_epoch_length > 0, BridgeError::InvalidBridgeParams);
        require!(self.reclaim_after > 0, BridgeError::InvalidBridgeParams);
        Ok(())
    }
}

impl BridgeConfig {
    pub fn new(authority: Pubkey, contract_identity: [u8; 20], params: &BridgeParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            authority,
            host_chain_id: params.host_chain_id,
            contract_identity,
            fees: params.fees.clone(),
            rate_epoch_length: params.rate_epoch_length,
            minimum_stake: params.minimum_stake,
            reclaim_after: params.reclaim_after,
            ..Default::default()
        })
    }

    /// Record a queued send: hand out the next nonce, credit the fee to the
    /// compensation pool and lock the value. A sponsored fee moves out of the
    /// sponsor funds. Either every counter changes or none does.
    pub fn record_send(&mut self, fee: u64, value: u64, sponsored: bool) -> Result<u64> {
        let nonce = self.next_nonce;
        let next_nonce = checked_add(nonce, 1)?;
        let relayer_pool = checked_add(self.relayer_pool, fee)?;
        let total_fees_collected = checked_add(self.total_fees_collected, fee)?;
        let locked_value = checked_add(self.locked_value, value)?;
        let sponsor_funds = if sponsored {
            self.sponsor_funds
                .checked_sub(fee)
                .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?
        } else {
            self.sponsor_funds
        };

        self.next_nonce = next_nonce;
        self.relayer_pool = relayer_pool;
        self.total_fees_collected = total_fees_collected;
        self.locked_value = locked_value;
        self.sponsor_funds = sponsor_funds;
        Ok(nonce)
    }

    /// Debit the compensation pool for a relayer payout
    pub fn pay_compensation(&mut self, amount: u64) -> Result<()> {
        require!(amount <= self.relayer_pool, BridgeError::InsufficientPoolBalance);
        self.relayer_pool -= amount;
        self.total_compensation_claimed = checked_add(self.total_compensation_claimed, amount)?;
        Ok(())
    }

    pub fn release_value(&mut self, value: u64) -> Result<()> {
        self.locked_value = self
            .locked_value
            .checked_sub(value)
            .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?;
        Ok(())
    }

    pub fn hold_sponsor_funds(&mut self, amount: u64) -> Result<()> {
        self.sponsor_funds = checked_add(self.sponsor_funds, amount)?;
        Ok(())
    }

    pub fn release_sponsor_funds(&mut self, amount: u64) -> Result<()> {
        self.sponsor_funds = self
            .sponsor_funds
            .checked_sub(amount)
            .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))?;
        Ok(())
    }

    /// Vault lamports owed to someone: the relayer pool, stakes, sponsor
    /// balances and locked outbound value. Inbound value may only be paid
    /// from what lies above this.
    pub fn reserved(&self, total_stake: u64) -> Result<u64> {
        [self.locked_value, self.sponsor_funds, total_stake]
            .into_iter()
            .try_fold(self.relayer_pool, checked_add)
    }
}

pub(crate) fn checked_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b)
        .ok_or_else(|| error!(BridgeError::ArithmeticOverflow))
}

/// Lamport custody for fees, stakes, sponsor balances and locked value
#[account]
#[derive(InitSpace)]
pub struct Vault {
    pub bump: u8,
}
