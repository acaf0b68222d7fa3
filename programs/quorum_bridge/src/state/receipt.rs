use anchor_lang::prelude::*;

use crate::errors::BridgeError;

/// Set of digests whose inbound message has been executed.
///
/// Insertion is permanent; a digest that is contained can never be executed again.
pub trait ProcessedSet {
    fn contains(&self, digest: &[u8; 32]) -> bool;

    fn insert(&mut self, digest: [u8; 32]) -> Result<()>;
}

/// Processed-set entry for one digest, addressed by `[RECEIPT_SEED, digest]`.
/// Also serves as the inbound audit record.
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct ProcessedReceipt {
    pub digest: [u8; 32],
    pub processed: bool,

    pub source_chain_id: u32,
    pub source_nonce: u64,

    /// Whether the destination call completed
    pub succeeded: bool,

    /// Account that submitted the message
    pub relayer: Pubkey,

    /// Slot of processing
    pub processed_at: u64,

    pub bump: u8,
}

impl ProcessedReceipt {
    /// Bind a freshly created receipt to its digest
    pub fn open(&mut self, digest: [u8; 32], bump: u8) {
        if self.digest == [0; 32] {
            self.digest = digest;
            self.bump = bump;
        }
    }

    pub fn record(
        &mut self,
        source_chain_id: u32,
        source_nonce: u64,
        succeeded: bool,
        relayer: Pubkey,
        now: u64,
    ) {
        self.source_chain_id = source_chain_id;
        self.source_nonce = source_nonce;
        self.succeeded = succeeded;
        self.relayer = relayer;
        self.processed_at = now;
    }
}

impl ProcessedSet for ProcessedReceipt {
    fn contains(&self, digest: &[u8; 32]) -> bool {
        self.processed && self.digest == *digest
    }

    fn insert(&mut self, digest: [u8; 32]) -> Result<()> {
        require!(!self.processed, BridgeError::AlreadyProcessed);
        require!(
            self.digest == [0; 32] || self.digest == digest,
            BridgeError::DigestMismatch
        );
        self.digest = digest;
        self.processed = true;
        Ok(())
    }
}

/// Highest source nonce processed for one `(source chain, sender)` pair on a
/// strict-ordering chain.
#[account]
#[derive(InitSpace, Default, Debug)]
pub struct SenderCursor {
    pub source_chain_id: u32,

    /// keccak256 of the foreign sender address
    pub sender_key: [u8; 32],

    /// None until the first message lands
    pub last_nonce: Option<u64>,

    pub bump: u8,
}

impl SenderCursor {
    pub fn ensure_matches(&self, source_chain_id: u32, sender_key: &[u8; 32]) -> Result<()> {
        require!(
            self.source_chain_id == source_chain_id && self.sender_key == *sender_key,
            BridgeError::SenderCursorMismatch
        );
        Ok(())
    }

    pub fn check(&self, source_nonce: u64) -> Result<()> {
        if let Some(last) = self.last_nonce {
            require!(source_nonce > last, BridgeError::OutOfOrder);
        }
        Ok(())
    }

    pub fn advance(&mut self, source_nonce: u64) {
        self.last_nonce = Some(source_nonce);
    }
}
