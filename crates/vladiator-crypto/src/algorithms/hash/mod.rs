// Path: crates/vladiator-crypto/src/algorithms/hash/mod.rs
//! Cryptographic hash functions.
//!
//! `keccak256` is the one that matters: it is the first step of the
//! canonical signing payload (spec: ABI-encode the request tuple, then
//! keccak-256 it) and of the EVM personal-message signing scheme used to
//! sign that digest.

use crate::error::CryptoError;
use sha3::{Digest, Keccak256};

/// A hash function that can be run over an arbitrary byte slice.
pub trait HashFunction {
    /// Hashes a message and returns the digest.
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// The digest size in bytes.
    fn digest_size(&self) -> usize;

    /// The name of the hash function.
    fn name(&self) -> &str;
}

/// Keccak-256, as used by every EVM chain for event topics and signing digests.
#[derive(Default, Clone)]
pub struct Keccak256Hash;

impl HashFunction for Keccak256Hash {
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut hasher = Keccak256::new();
        hasher.update(message);
        Ok(hasher.finalize().to_vec())
    }

    fn digest_size(&self) -> usize {
        32
    }

    fn name(&self) -> &str {
        "Keccak-256"
    }
}

/// Hashes `data` with Keccak-256 and returns the fixed-size digest.
///
/// This is the hash half of the canonical signing payload: callers ABI-encode
/// the request tuple themselves (driver-specific) and pass the encoded bytes
/// here before handing the digest to a signer.
pub fn keccak256<T: AsRef<[u8]>>(data: T) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_is_deterministic() {
        let message = b"vladiator";
        assert_eq!(keccak256(message), keccak256(message));
    }

    #[test]
    fn keccak256_hash_function_matches_free_function() {
        let message = b"canonical tuple bytes";
        let hasher = Keccak256Hash;
        assert_eq!(hasher.hash(message).unwrap(), keccak256(message).to_vec());
        assert_eq!(hasher.digest_size(), 32);
    }

    #[test]
    fn empty_input_hash_is_the_well_known_constant() {
        // keccak256("") = c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
        let expected =
            hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a47")
                .unwrap();
        assert_eq!(keccak256(b"").to_vec(), expected);
    }
}
