use anchor_lang::prelude::*;

use crate::constants::MAX_RELAYERS;
use crate::errors::BridgeError;
use crate::state::bridge::checked_add;

/// Registered relayers, addressed by index.
///
/// A removed relayer leaves an empty slot so the indices of the others stay
/// stable; registration reuses the lowest free slot.
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct RelayerSet {
    /// Signatures required for quorum (M)
    pub required_signatures: u8,

    /// Occupied slots (N)
    pub active_count: u8,

    /// Bounded by `MAX_RELAYERS`
    #[max_len(32)]
    pub slots: Vec<Option<RelayerEntry>>,

    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Debug, PartialEq, Eq)]
pub struct RelayerEntry {
    /// Account that staked and may withdraw
    pub owner: Pubkey,

    /// Ed25519 attestation key
    pub public_key: [u8; 32],

    pub stake: u64,

    /// Compensation credited but not yet claimed
    pub earned: u64,

    pub registered_at: u64,
}

impl RelayerSet {
    pub fn entry(&self, index: u8) -> Option<&RelayerEntry> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    fn entry_mut(&mut self, index: u8) -> Result<&mut RelayerEntry> {
        self.slots
            .get_mut(index as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| error!(BridgeError::UnknownRelayer))
    }

    pub fn index_of_owner(&self, owner: &Pubkey) -> Option<u8> {
        self.occupied()
            .find(|(_, entry)| entry.owner == *owner)
            .map(|(index, _)| index)
    }

    fn occupied(&self) -> impl Iterator<Item = (u8, &RelayerEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (index as u8, entry)))
    }

    /// Lamports staked by all registered relayers
    pub fn total_stake(&self) -> Result<u64> {
        self.occupied()
            .try_fold(0u64, |total, (_, entry)| checked_add(total, entry.stake))
    }

    /// Add a relayer in the lowest free slot and return its index
    pub fn register(
        &mut self,
        owner: Pubkey,
        public_key: [u8; 32],
        stake: u64,
        minimum_stake: u64,
        now: u64,
    ) -> Result<u8> {
        require!(stake >= minimum_stake, BridgeError::InsufficientStake);
        require!(
            !self.occupied().any(|(_, entry)| entry.public_key == public_key),
            BridgeError::RelayerAlreadyRegistered
        );

        let entry = RelayerEntry {
            owner,
            public_key,
            stake,
            earned: 0,
            registered_at: now,
        };
        let index = match self.slots.iter().position(Option::is_none) {
            Some(free) => {
                self.slots[free] = Some(entry);
                free
            }
            None => {
                require!(self.slots.len() < MAX_RELAYERS, BridgeError::RelayerSetFull);
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };

        self.active_count += 1;
        if self.required_signatures == 0 {
            self.required_signatures = 1;
        }
        Ok(index as u8)
    }

    /// Remove a relayer, refusing to leave fewer relayers than the threshold
    pub fn remove(&mut self, index: u8) -> Result<RelayerEntry> {
        self.entry(index)
            .ok_or_else(|| error!(BridgeError::UnknownRelayer))?;
        let remaining = self.active_count - 1;
        require!(
            self.required_signatures <= remaining,
            BridgeError::ThresholdTooHigh
        );

        let entry = self.slots[index as usize]
            .take()
            .ok_or_else(|| error!(BridgeError::UnknownRelayer))?;
        self.active_count = remaining;
        Ok(entry)
    }

    /// Self-service exit; only the owner of the slot may withdraw it
    pub fn unregister(&mut self, index: u8, caller: &Pubkey) -> Result<RelayerEntry> {
        self.ensure_owner(index, caller)?;
        self.remove(index)
    }

    pub fn set_threshold(&mut self, required_signatures: u8) -> Result<()> {
        require!(required_signatures >= 1, BridgeError::InvalidThreshold);
        require!(
            required_signatures <= self.active_count,
            BridgeError::ThresholdTooHigh
        );
        self.required_signatures = required_signatures;
        Ok(())
    }

    pub fn ensure_owner(&self, index: u8, caller: &Pubkey) -> Result<()> {
        let entry = self
            .entry(index)
            .ok_or_else(|| error!(BridgeError::UnknownRelayer))?;
        require_keys_eq!(entry.owner, *caller, BridgeError::NotRelayerOwner);
        Ok(())
    }

    pub fn credit(&mut self, index: u8, amount: u64) -> Result<()> {
        let entry = self.entry_mut(index)?;
        entry.earned = checked_add(entry.earned, amount)?;
        Ok(())
    }

    /// Deduct a claim from the relayer's earnings. The pool bound is checked by the caller.
    pub fn debit_earnings(&mut self, index: u8, caller: &Pubkey, amount: u64) -> Result<()> {
        require!(amount > 0, BridgeError::InvalidAmount);
        self.ensure_owner(index, caller)?;
        let entry = self.entry_mut(index)?;
        require!(amount <= entry.earned, BridgeError::InsufficientEarnings);
        entry.earned -= amount;
        Ok(())
    }
}
