use anchor_lang::prelude::*;

use crate::constants::MAX_SOURCE_SENDER_LEN;
use crate::errors::BridgeError;

/// Message arriving from a remote chain. Never stored; only its digest is.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub source_chain_id: u32,
    pub source_nonce: u64,

    /// Foreign address encoding of the remote sender
    pub source_sender: Vec<u8>,

    pub destination_address: [u8; 20],
    pub payload: Vec<u8>,

    /// Lamports released from the vault to the destination
    pub value: u64,

    pub compute_budget: u64,
}

impl InboundMessage {
    /// Shape checks that need no chain state
    pub fn validate(&self) -> Result<()> {
        require!(!self.source_sender.is_empty(), BridgeError::EmptySender);
        require!(
            self.source_sender.len() <= MAX_SOURCE_SENDER_LEN,
            BridgeError::SenderTooLong
        );
        Ok(())
    }
}

/// One relayer's signature over a digest
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Attestation {
    pub relayer_index: u8,

    /// Ed25519 signature (64 bytes)
    pub signature: [u8; 64],
}

/// Instruction data handed to a destination program
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InboundDelivery {
    pub digest: [u8; 32],
    pub source_chain_id: u32,
    pub source_nonce: u64,
    pub source_sender: Vec<u8>,
    pub value: u64,
    pub payload: Vec<u8>,
}

impl InboundDelivery {
    pub fn new(digest: [u8; 32], message: &InboundMessage) -> Self {
        Self {
            digest,
            source_chain_id: message.source_chain_id,
            source_nonce: message.source_nonce,
            source_sender: message.source_sender.clone(),
            value: message.value,
            payload: message.payload.clone(),
        }
    }
}
