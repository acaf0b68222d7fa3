use anchor_lang::prelude::*;

use crate::state::{ChainParams, FeePayer, FeeSchedule, MessageStatus};

/// Event emitted when an outbound message is queued. Carries every field of
/// the digest relayers sign on the destination chain.
#[event]
pub struct MessageSent {
    pub nonce: u64,
    pub host_chain_id: u32,
    pub contract_identity: [u8; 20],
    pub destination_chain_id: u32,
    pub sender: Pubkey,
    /// 20-byte encoding of `sender`, used as the source sender on the far side
    pub source_sender: [u8; 20],
    pub destination_address: [u8; 20],
    pub payload: Vec<u8>,
    pub value: u64,
    pub compute_budget: u64,
    pub fee: u64,
    pub fee_payer: FeePayer,
    /// Blocks relayers wait before attesting
    pub confirmations: u32,
    pub created_at: u64,
}

/// Event emitted when an inbound message is executed
#[event]
pub struct MessageProcessed {
    pub digest: [u8; 32],
    pub source_chain_id: u32,
    pub source_nonce: u64,
    pub destination_address: [u8; 20],
    pub relayer: Pubkey,
    pub succeeded: bool,
}

/// Event emitted when an outbound message changes status
#[event]
pub struct MessageStatusChanged {
    pub nonce: u64,
    pub status: MessageStatus,
}

#[event]
pub struct RelayerRegistered {
    pub index: u8,
    pub owner: Pubkey,
    pub public_key: [u8; 32],
    pub stake: u64,
}

#[event]
pub struct RelayerUnregistered {
    pub index: u8,
    pub owner: Pubkey,
    /// Stake and earnings returned
    pub payout: u64,
}

#[event]
pub struct ThresholdUpdated {
    pub required_signatures: u8,
    pub active_count: u8,
}

#[event]
pub struct ChainConfigured {
    pub chain_id: u32,
    pub params: ChainParams,
}

#[event]
pub struct ChainPauseUpdated {
    pub chain_id: u32,
    pub active: bool,
}

#[event]
pub struct CompensationClaimed {
    pub index: u8,
    pub owner: Pubkey,
    pub amount: u64,
}

#[event]
pub struct SponsorBalanceChanged {
    pub sponsor: Pubkey,
    pub balance: u64,
}

#[event]
pub struct FeeScheduleUpdated {
    pub fees: FeeSchedule,
}

#[event]
pub struct AuthorityTransferred {
    pub previous: Pubkey,
    pub new_authority: Pubkey,
}
