use anchor_lang::prelude::*;

use crate::errors::BridgeError;

/// Append-only record of a message leaving this chain, addressed by nonce
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub nonce: u64,
    pub destination_chain_id: u32,
    pub sender: Pubkey,
    pub destination_address: [u8; 20],
    pub payload: Vec<u8>,

    /// Lamports locked in the vault for delivery on the far side
    pub value: u64,

    pub compute_budget: u64,
    pub fee: u64,
    pub fee_payer: FeePayer,

    /// Slot at which the message was queued
    pub created_at: u64,

    pub status: MessageStatus,
    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageStatus {
    Queued,
    Relayed,
    Confirmed,
    Failed,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeePayer {
    Sender,
    Sponsor(Pubkey),
}

impl OutboundMessage {
    /// Calculate the space needed for a message carrying `payload_len` bytes
    pub fn space(payload_len: usize) -> usize {
        8 +                     // discriminator
        8 +                     // nonce
        4 +                     // destination_chain_id
        32 +                    // sender
        20 +                    // destination_address
        4 + payload_len +       // payload vec
        8 +                     // value
        8 +                     // compute_budget
        8 +                     // fee
        1 + 32 +                // fee_payer
        8 +                     // created_at
        1 +                     // status
        1                       // bump
    }

    /// Optimistic pickup notice from a relayer
    pub fn mark_relayed(&mut self) -> Result<()> {
        require!(
            self.status == MessageStatus::Queued,
            BridgeError::InvalidStatusTransition
        );
        self.status = MessageStatus::Relayed;
        Ok(())
    }

    /// Delivery proven on the far side
    pub fn confirm(&mut self) -> Result<()> {
        require!(
            matches!(self.status, MessageStatus::Queued | MessageStatus::Relayed),
            BridgeError::InvalidStatusTransition
        );
        self.status = MessageStatus::Confirmed;
        Ok(())
    }

    /// Time out an unconfirmed message; returns the value owed back to the sender.
    /// `Relayed` is only a pickup notice and does not block the timeout.
    pub fn reclaim(&mut self, caller: &Pubkey, now: u64, reclaim_after: u64) -> Result<u64> {
        require_keys_eq!(self.sender, *caller, BridgeError::NotMessageSender);
        require!(
            matches!(self.status, MessageStatus::Queued | MessageStatus::Relayed),
            BridgeError::InvalidStatusTransition
        );
        require!(
            now >= self.created_at.saturating_add(reclaim_after),
            BridgeError::ReclaimTooEarly
        );
        self.status = MessageStatus::Failed;
        Ok(self.value)
    }
}
