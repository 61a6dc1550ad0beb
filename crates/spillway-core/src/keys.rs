//! Signing credential handling.
//!
//! The configuration carries the sender's key as hex of its canonical CBOR
//! envelope: a byte string wrapping a 32-byte Ed25519 seed. From the seed we
//! derive the verification key and the blake2b-224 payment hash that must
//! match the sender address's payment credential.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;

use crate::address::CREDENTIAL_LEN;

type Blake2b224 = Blake2b<U28>;
type Blake2b256 = Blake2b<U32>;

/// Ed25519 seed length in bytes.
pub const SEED_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid key envelope: {0}")]
    Envelope(String),

    #[error("signing key seed must be {SEED_LEN} bytes, got {0}")]
    BadLength(usize),
}

/// The sender's signing capability: seed key plus the values derived from
/// it once at construction.
#[derive(Clone)]
pub struct Credential {
    signing: SigningKey,
    verification_key: [u8; SEED_LEN],
    payment_hash: [u8; CREDENTIAL_LEN],
}

impl Credential {
    /// Decode from the configured hex-of-CBOR representation.
    pub fn from_cbor_hex(input: &str) -> Result<Self, KeyError> {
        let envelope = hex::decode(input.trim())?;
        let mut decoder = minicbor::Decoder::new(&envelope);
        let seed = decoder
            .bytes()
            .map_err(|err| KeyError::Envelope(err.to_string()))?;
        let seed: [u8; SEED_LEN] = seed
            .try_into()
            .map_err(|_| KeyError::BadLength(seed.len()))?;

        let signing = SigningKey::from_bytes(&seed);
        let verification_key = signing.verifying_key().to_bytes();
        let payment_hash = blake2b_224(&verification_key);
        Ok(Self {
            signing,
            verification_key,
            payment_hash,
        })
    }

    pub const fn verification_key(&self) -> &[u8; SEED_LEN] {
        &self.verification_key
    }

    /// Hash the sender address's payment part must equal.
    pub const fn payment_hash(&self) -> &[u8; CREDENTIAL_LEN] {
        &self.payment_hash
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

// Keeps the seed out of debug output.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("verification_key", &hex::encode(self.verification_key))
            .finish_non_exhaustive()
    }
}

/// 224-bit blake2b, the chain's credential hash.
pub fn blake2b_224(data: &[u8]) -> [u8; CREDENTIAL_LEN] {
    let mut hasher = Blake2b224::new();
    hasher.update(data);
    let mut output = [0u8; CREDENTIAL_LEN];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// 256-bit blake2b, used for transaction ids and signing messages.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}
