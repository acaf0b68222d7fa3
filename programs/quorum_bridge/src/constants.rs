/// Constants for the quorum bridge
pub const BRIDGE_SEED: &[u8] = b"bridge";
pub const VAULT_SEED: &[u8] = b"vault";
pub const CHAIN_SEED: &[u8] = b"chain";
pub const RELAYERS_SEED: &[u8] = b"relayers";
pub const OUTBOUND_SEED: &[u8] = b"outbound";
pub const RECEIPT_SEED: &[u8] = b"receipt";
pub const CURSOR_SEED: &[u8] = b"cursor";
pub const SPONSOR_SEED: &[u8] = b"sponsor";
pub const EXECUTOR_SEED: &[u8] = b"executor";

/// Seed of the PDA, owned by a destination program, that receives bridged value
pub const INBOX_SEED: &[u8] = b"bridge_inbox";

/// Digest layout version, first byte of every message digest preimage
pub const DIGEST_VERSION: u8 = 1;
pub const BATCH_DIGEST_TAG: &[u8] = b"quorum-bridge/batch";
pub const CONFIRMATION_DIGEST_TAG: &[u8] = b"quorum-bridge/confirm";

/// Maximum sizes for DOS protection
pub const MAX_PAYLOAD_BYTES: u32 = 1024;
pub const MAX_SOURCE_SENDER_LEN: usize = 64;

/// Relayer set constants
pub const MAX_RELAYERS: usize = 32;
pub const MAX_ATTESTATIONS: usize = MAX_RELAYERS;
pub const ED25519_SIGNATURE_SIZE: usize = 64;
pub const ED25519_PUBKEY_SIZE: usize = 32;

pub const MAX_BATCH_SIZE: usize = 8;
pub const MAX_SPONSORED_TARGETS: usize = 16;

/// Per-chain fee multipliers are expressed in basis points
pub const FEE_MULTIPLIER_DENOMINATOR: u64 = 10_000;
