use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    ed25519_program,
    instruction::Instruction,
    sysvar::instructions::{self, load_instruction_at_checked},
};

use crate::{
    constants::{ED25519_PUBKEY_SIZE, ED25519_SIGNATURE_SIZE, MAX_ATTESTATIONS},
    errors::BridgeError,
    state::{Attestation, RelayerSet},
};

/// Crypto provider used for attestation checks
pub trait SignatureVerifier {
    fn verify(&self, public_key: &[u8; 32], message: &[u8; 32], signature: &[u8; 64]) -> bool;
}

/// Outcome of checking a set of attestations against the current relayer set
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuorumTally {
    /// Valid signatures from registered relayers
    pub valid: u8,
    /// Attestations naming an empty or unknown relayer slot
    pub inactive: u8,
    /// Registered relayers whose signature did not verify
    pub invalid: u8,
    pub required: u8,
}

impl QuorumTally {
    pub fn is_met(&self) -> bool {
        self.required >= 1 && self.valid >= self.required
    }
}

/// Count valid, unique, currently registered signatures over `digest`.
///
/// Duplicate relayer indices reject the whole set. Removed relayers are not
/// counted even if they signed before leaving.
pub fn tally_attestations<V: SignatureVerifier>(
    relayers: &RelayerSet,
    digest: &[u8; 32],
    attestations: &[Attestation],
    verifier: &V,
) -> Result<QuorumTally> {
    require!(
        attestations.len() <= MAX_ATTESTATIONS,
        BridgeError::TooManyAttestations
    );

    let mut tally = QuorumTally {
        required: relayers.required_signatures,
        ..Default::default()
    };
    let mut seen = [false; 256];

    for attestation in attestations {
        let index = attestation.relayer_index as usize;
        require!(!seen[index], BridgeError::DuplicateSigner);
        seen[index] = true;

        match relayers.entry(attestation.relayer_index) {
            None => tally.inactive += 1,
            Some(entry) if verifier.verify(&entry.public_key, digest, &attestation.signature) => {
                tally.valid += 1
            }
            Some(_) => tally.invalid += 1,
        }
    }

    Ok(tally)
}

/// Pure quorum check: true iff at least `required_signatures` distinct
/// registered relayers validly signed `digest`.
pub fn verify_quorum<V: SignatureVerifier>(
    relayers: &RelayerSet,
    digest: &[u8; 32],
    attestations: &[Attestation],
    verifier: &V,
) -> bool {
    tally_attestations(relayers, digest, attestations, verifier)
        .map(|tally| tally.is_met())
        .unwrap_or(false)
}

/// Like [`verify_quorum`] but reports why the quorum failed
pub fn require_quorum<V: SignatureVerifier>(
    relayers: &RelayerSet,
    digest: &[u8; 32],
    attestations: &[Attestation],
    verifier: &V,
) -> Result<QuorumTally> {
    let tally = tally_attestations(relayers, digest, attestations, verifier)?;
    if !tally.is_met() {
        msg!(
            "Quorum not met: valid={}, inactive={}, invalid={}, required={}",
            tally.valid,
            tally.inactive,
            tally.invalid,
            tally.required
        );
        return err!(BridgeError::QuorumNotMet);
    }
    Ok(tally)
}

/// Signatures proven by Ed25519 precompile instructions earlier in the transaction
pub struct Ed25519SysvarVerifier {
    verified: Vec<VerifiedSignature>,
}

#[derive(Debug)]
struct VerifiedSignature {
    public_key: [u8; 32],
    signature: [u8; 64],
    message: Vec<u8>,
}

impl Ed25519SysvarVerifier {
    /// Collect every signature checked by the Ed25519 program before the current instruction
    pub fn load(ix_sysvar_account: &AccountInfo) -> Result<Self> {
        require_keys_eq!(
            *ix_sysvar_account.key,
            instructions::ID,
            BridgeError::InvalidEd25519Instruction
        );
        let current_index = instructions::load_current_index_checked(ix_sysvar_account)?;

        let mut verified = Vec::new();
        for i in 0..current_index {
            let ix = load_instruction_at_checked(i as usize, ix_sysvar_account)?;
            if ix.program_id == ed25519_program::ID {
                verified.extend(parse_ed25519_instruction(&ix)?);
            }
        }
        Ok(Self { verified })
    }
}

impl SignatureVerifier for Ed25519SysvarVerifier {
    fn verify(&self, public_key: &[u8; 32], message: &[u8; 32], signature: &[u8; 64]) -> bool {
        self.verified.iter().any(|v| {
            v.public_key == *public_key && v.signature == *signature && v.message == message.as_slice()
        })
    }
}

const SIGNATURE_OFFSETS_START: usize = 2;
const SIGNATURE_OFFSETS_SIZE: usize = 14;
const CURRENT_INSTRUCTION: u16 = u16::MAX;

/// Parse Ed25519 instruction data.
///
/// Format: `[num_signatures:u8, padding:u8]` followed by one 14-byte offsets
/// record per signature (`signature_offset`, `signature_ix_index`,
/// `public_key_offset`, `public_key_ix_index`, `message_offset`,
/// `message_size`, `message_ix_index`, all u16 LE). Only records that point
/// into the same instruction are accepted.
fn parse_ed25519_instruction(ix: &Instruction) -> Result<Vec<VerifiedSignature>> {
    let data = &ix.data;
    require!(
        data.len() >= SIGNATURE_OFFSETS_START,
        BridgeError::InvalidEd25519Instruction
    );
    let count = data[0] as usize;

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let start = SIGNATURE_OFFSETS_START + i * SIGNATURE_OFFSETS_SIZE;
        let record = data
            .get(start..start + SIGNATURE_OFFSETS_SIZE)
            .ok_or_else(|| error!(BridgeError::InvalidEd25519Instruction))?;
        let field = |n: usize| u16::from_le_bytes([record[2 * n], record[2 * n + 1]]);

        let (signature_offset, signature_ix) = (field(0) as usize, field(1));
        let (public_key_offset, public_key_ix) = (field(2) as usize, field(3));
        let (message_offset, message_size, message_ix) = (field(4) as usize, field(5) as usize, field(6));

        require!(
            signature_ix == CURRENT_INSTRUCTION
                && public_key_ix == CURRENT_INSTRUCTION
                && message_ix == CURRENT_INSTRUCTION,
            BridgeError::InvalidEd25519Instruction
        );

        let slice = |offset: usize, len: usize| {
            data.get(offset..offset + len)
                .ok_or_else(|| error!(BridgeError::InvalidEd25519Instruction))
        };

        let mut signature = [0u8; ED25519_SIGNATURE_SIZE];
        signature.copy_from_slice(slice(signature_offset, ED25519_SIGNATURE_SIZE)?);
        let mut public_key = [0u8; ED25519_PUBKEY_SIZE];
        public_key.copy_from_slice(slice(public_key_offset, ED25519_PUBKEY_SIZE)?);
        let message = slice(message_offset, message_size)?.to_vec();

        out.push(VerifiedSignature {
            public_key,
            signature,
            message,
        });
    }
    Ok(out)
}
