//! Shared fixtures for unit tests

use std::collections::BTreeSet;

use anchor_lang::error::Error;
use anchor_lang::prelude::{Pubkey, Result};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};

use crate::errors::BridgeError;
use crate::processor::MessageExecutor;
use crate::state::{
    Attestation, BridgeConfig, BridgeParams, ChainConfig, ChainParams, FeeSchedule, GoverningAuthority,
    InboundMessage, ProcessedSet, RelayerSet,
};
use crate::utils::signature::SignatureVerifier;

pub const HOST_CHAIN_ID: u32 = 900;
pub const CONTRACT_IDENTITY: [u8; 20] = [0xC0; 20];

pub fn fee_schedule() -> FeeSchedule {
    FeeSchedule {
        base_fee: 5_000,
        per_byte_fee: 10,
        per_compute_unit_fee: 2,
        relay_reward: 1_000,
    }
}

pub fn bridge_params() -> BridgeParams {
    BridgeParams {
        host_chain_id: HOST_CHAIN_ID,
        fees: fee_schedule(),
        rate_epoch_length: 100,
        minimum_stake: relayers_stake(),
        reclaim_after: 50,
    }
}

pub fn bridge_config() -> BridgeConfig {
    BridgeConfig::new(Pubkey::new_unique(), CONTRACT_IDENTITY, &bridge_params())
        .expect("valid bridge params")
}

pub fn chain_params() -> ChainParams {
    ChainParams {
        confirmations: 12,
        max_message_bytes: 1024,
        max_compute_budget: 200_000,
        fee_multiplier_bps: 10_000,
        rate_limit_per_epoch: 5,
        strict_ordering: false,
    }
}

pub fn chain_config(chain_id: u32) -> ChainConfig {
    let mut chain = ChainConfig::default();
    chain.apply(chain_id, &chain_params()).expect("valid chain params");
    chain
}

pub fn relayers_stake() -> u64 {
    1_000
}

pub fn inbound_message(source_chain_id: u32, source_nonce: u64) -> InboundMessage {
    InboundMessage {
        source_chain_id,
        source_nonce,
        source_sender: vec![0x5E; 20],
        destination_address: [0xD0; 20],
        payload: b"transfer(alice, 42)".to_vec(),
        value: 0,
        compute_budget: 50_000,
    }
}

/// Relayer with a deterministic Ed25519 key
pub struct TestRelayer {
    pub owner: Pubkey,
    pub signing_key: SigningKey,
}

impl TestRelayer {
    pub fn new(seed: u8) -> Self {
        Self {
            owner: Pubkey::new_unique(),
            signing_key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    pub fn many(n: u8) -> Vec<Self> {
        (1..=n).map(Self::new).collect()
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

/// Relayer set with `relayers` registered at indices 0.. and threshold `m`
pub fn relayer_set(relayers: &[TestRelayer], m: u8) -> RelayerSet {
    let mut set = RelayerSet::default();
    for relayer in relayers {
        set.register(relayer.owner, relayer.public_key(), relayers_stake(), relayers_stake(), 0)
            .expect("register relayer");
    }
    set.set_threshold(m).expect("threshold within set");
    set
}

pub fn sign(relayer: &TestRelayer, relayer_index: u8, digest: &[u8; 32]) -> Attestation {
    Attestation {
        relayer_index,
        signature: relayer.signing_key.sign(digest).to_bytes(),
    }
}

pub struct DalekVerifier;

impl SignatureVerifier for DalekVerifier {
    fn verify(&self, public_key: &[u8; 32], message: &[u8; 32], signature: &[u8; 64]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(public_key) else {
            return false;
        };
        key.verify(message, &Signature::from_bytes(signature)).is_ok()
    }
}

/// Executor that records deliveries and can be told to fail
#[derive(Default, Clone, Debug)]
pub struct RecordingExecutor {
    pub executed: Vec<[u8; 32]>,
    pub value_delivered: u64,
    pub fail_prepare: bool,
    pub fail_execution: bool,
}

impl MessageExecutor for RecordingExecutor {
    fn prepare(&self, _message: &InboundMessage) -> Result<()> {
        if self.fail_prepare {
            return Err(BridgeError::DestinationMismatch.into());
        }
        Ok(())
    }

    fn execute(&mut self, digest: &[u8; 32], message: &InboundMessage) -> Result<()> {
        if self.fail_execution {
            return Err(anchor_lang::error::ErrorCode::ConstraintRaw.into());
        }
        self.executed.push(*digest);
        self.value_delivered += message.value;
        Ok(())
    }
}

impl ProcessedSet for BTreeSet<[u8; 32]> {
    fn contains(&self, digest: &[u8; 32]) -> bool {
        BTreeSet::contains(self, digest)
    }

    fn insert(&mut self, digest: [u8; 32]) -> Result<()> {
        if !BTreeSet::insert(self, digest) {
            return Err(BridgeError::AlreadyProcessed.into());
        }
        Ok(())
    }
}

/// Governing authority where any council member may act
pub struct CouncilAuthority {
    pub members: Vec<Pubkey>,
}

impl CouncilAuthority {
    pub fn new(size: usize) -> Self {
        Self {
            members: (0..size).map(|_| Pubkey::new_unique()).collect(),
        }
    }
}

impl GoverningAuthority for CouncilAuthority {
    fn is_authorized(&self, actor: &Pubkey) -> bool {
        self.members.contains(actor)
    }
}

pub fn assert_bridge_error<T: std::fmt::Debug>(result: Result<T>, expected: BridgeError) {
    let code = u32::from(expected);
    match result {
        Err(Error::AnchorError(err)) => assert_eq!(
            err.error_code_number, code,
            "expected {expected:?}, got {}",
            err.error_name
        ),
        other => panic!("expected {expected:?}, got {other:?}"),
    }
}
