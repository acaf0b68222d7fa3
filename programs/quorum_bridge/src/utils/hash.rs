use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;

use crate::constants::{BATCH_DIGEST_TAG, CONFIRMATION_DIGEST_TAG, DIGEST_VERSION};
use crate::errors::BridgeError;
use crate::state::InboundMessage;

/// Cross-chain message digest, signed by relayers and used as the replay key.
///
/// Layout (integers big-endian):
/// `version:1 | host_chain_id:4 | contract_identity:20 | source_chain_id:4 |
///  source_nonce:8 | sender_len:1 | sender | destination:20 |
///  keccak(payload):32 | value:32 | compute_budget:8`
pub fn message_digest(
    host_chain_id: u32,
    contract_identity: &[u8; 20],
    message: &InboundMessage,
) -> Result<[u8; 32]> {
    message.validate()?;
    let preimage = digest_preimage(host_chain_id, contract_identity, message);
    Ok(keccak::hash(&preimage).to_bytes())
}

fn digest_preimage(host_chain_id: u32, contract_identity: &[u8; 20], message: &InboundMessage) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(130 + message.source_sender.len());

    encoded.push(DIGEST_VERSION);
    encoded.extend_from_slice(&host_chain_id.to_be_bytes());
    encoded.extend_from_slice(contract_identity);
    encoded.extend_from_slice(&message.source_chain_id.to_be_bytes());
    encoded.extend_from_slice(&message.source_nonce.to_be_bytes());

    // Length fits in one byte, checked by InboundMessage::validate
    encoded.push(message.source_sender.len() as u8);
    encoded.extend_from_slice(&message.source_sender);

    encoded.extend_from_slice(&message.destination_address);
    encoded.extend_from_slice(&payload_hash(&message.payload));
    encoded.extend_from_slice(&u256_be(message.value));
    encoded.extend_from_slice(&message.compute_budget.to_be_bytes());

    encoded
}

pub fn payload_hash(payload: &[u8]) -> [u8; 32] {
    keccak::hash(payload).to_bytes()
}

/// Digest a batch quorum signs over
pub fn batch_digest(digests: &[[u8; 32]]) -> [u8; 32] {
    let count = (digests.len() as u32).to_be_bytes();
    let mut parts: Vec<&[u8]> = Vec::with_capacity(digests.len() + 2);
    parts.push(BATCH_DIGEST_TAG);
    parts.push(&count);
    parts.extend(digests.iter().map(|d| d.as_slice()));
    keccak::hashv(&parts).to_bytes()
}

/// Digest attesting that outbound message `nonce` was delivered on `destination_chain_id`
pub fn confirmation_digest(
    host_chain_id: u32,
    contract_identity: &[u8; 20],
    destination_chain_id: u32,
    nonce: u64,
) -> [u8; 32] {
    keccak::hashv(&[
        CONFIRMATION_DIGEST_TAG,
        [DIGEST_VERSION].as_slice(),
        host_chain_id.to_be_bytes().as_slice(),
        contract_identity.as_slice(),
        destination_chain_id.to_be_bytes().as_slice(),
        nonce.to_be_bytes().as_slice(),
    ])
    .to_bytes()
}

/// 20-byte address of a Solana key: the last 20 bytes of its keccak256 hash
pub fn evm_address(key: &Pubkey) -> [u8; 20] {
    let hash = keccak::hash(key.as_ref()).to_bytes();
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Seed component identifying a foreign sender
pub fn sender_key(source_sender: &[u8]) -> [u8; 32] {
    keccak::hash(source_sender).to_bytes()
}

fn u256_be(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Validate message hash format
pub fn validate_message_hash(hash: &[u8; 32]) -> Result<()> {
    // Ensure hash is not all zeros (invalid hash)
    require!(
        !hash.iter().all(|&b| b == 0),
        BridgeError::InvalidMessageHash
    );

    Ok(())
}

/// Verify a relayer-supplied digest matches the message
pub fn verify_digest_consistency(
    supplied: &[u8; 32],
    host_chain_id: u32,
    contract_identity: &[u8; 20],
    message: &InboundMessage,
) -> Result<[u8; 32]> {
    validate_message_hash(supplied)?;
    let calculated = message_digest(host_chain_id, contract_identity, message)?;
    require!(supplied == &calculated, BridgeError::DigestMismatch);
    Ok(calculated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_bridge_error, inbound_message, CONTRACT_IDENTITY, HOST_CHAIN_ID};

    #[test]
    fn preimage_layout_is_bit_exact() {
        let message = InboundMessage {
            source_chain_id: 7,
            source_nonce: 5,
            source_sender: vec![0xAA, 0xBB, 0xCC],
            destination_address: [0x11; 20],
            payload: b"hello".to_vec(),
            value: 0x0102,
            compute_budget: 0x0A0B,
        };
        let preimage = digest_preimage(0x0000_0065, &[0x22; 20], &message);

        assert_eq!(preimage.len(), 130 + 3);
        assert_eq!(preimage[0], DIGEST_VERSION);
        assert_eq!(&preimage[1..5], &[0, 0, 0, 0x65]);
        assert_eq!(&preimage[5..25], &[0x22; 20]);
        assert_eq!(&preimage[25..29], &[0, 0, 0, 7]);
        assert_eq!(&preimage[29..37], &[0, 0, 0, 0, 0, 0, 0, 5]);
        assert_eq!(preimage[37], 3);
        assert_eq!(&preimage[38..41], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(&preimage[41..61], &[0x11; 20]);
        assert_eq!(&preimage[61..93], &payload_hash(b"hello"));
        assert_eq!(&preimage[93..123], &[0u8; 30]);
        assert_eq!(&preimage[123..125], &[0x01, 0x02]);
        assert_eq!(&preimage[125..133], &[0, 0, 0, 0, 0, 0, 0x0A, 0x0B]);
    }

    #[test]
    fn every_field_changes_the_digest() {
        let base = inbound_message(7, 5);
        let digest = message_digest(HOST_CHAIN_ID, &CONTRACT_IDENTITY, &base).unwrap();

        let variants = [
            InboundMessage { source_chain_id: 8, ..base.clone() },
            InboundMessage { source_nonce: 6, ..base.clone() },
            InboundMessage { source_sender: vec![9; 20], ..base.clone() },
            InboundMessage { destination_address: [0xEE; 20], ..base.clone() },
            InboundMessage { payload: b"other".to_vec(), ..base.clone() },
            InboundMessage { value: base.value + 1, ..base.clone() },
            InboundMessage { compute_budget: base.compute_budget + 1, ..base.clone() },
        ];
        for variant in variants {
            assert_ne!(message_digest(HOST_CHAIN_ID, &CONTRACT_IDENTITY, &variant).unwrap(), digest);
        }

        // Domain separation by host chain and contract identity
        assert_ne!(message_digest(HOST_CHAIN_ID + 1, &CONTRACT_IDENTITY, &base).unwrap(), digest);
        assert_ne!(message_digest(HOST_CHAIN_ID, &[0; 20], &base).unwrap(), digest);
    }

    #[test]
    fn batch_digest_depends_on_order_and_members() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(batch_digest(&[a, b]), batch_digest(&[b, a]));
        assert_ne!(batch_digest(&[a]), batch_digest(&[a, a]));
        assert_ne!(batch_digest(&[a]), a);
    }

    #[test]
    fn confirmation_digest_is_not_a_message_digest() {
        let c1 = confirmation_digest(HOST_CHAIN_ID, &CONTRACT_IDENTITY, 7, 1);
        let c2 = confirmation_digest(HOST_CHAIN_ID, &CONTRACT_IDENTITY, 7, 2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn supplied_digest_must_match() {
        let message = inbound_message(7, 5);
        let digest = message_digest(HOST_CHAIN_ID, &CONTRACT_IDENTITY, &message).unwrap();
        assert_eq!(
            verify_digest_consistency(&digest, HOST_CHAIN_ID, &CONTRACT_IDENTITY, &message).unwrap(),
            digest
        );
        assert_bridge_error(
            verify_digest_consistency(&[1; 32], HOST_CHAIN_ID, &CONTRACT_IDENTITY, &message),
            BridgeError::DigestMismatch,
        );
        assert_bridge_error(
            verify_digest_consistency(&[0; 32], HOST_CHAIN_ID, &CONTRACT_IDENTITY, &message),
            BridgeError::InvalidMessageHash,
        );
    }

    #[test]
    fn evm_address_is_hash_suffix() {
        let key = Pubkey::new_unique();
        let hash = keccak::hash(key.as_ref()).to_bytes();
        assert_eq!(&evm_address(&key)[..], &hash[12..]);
    }
}
