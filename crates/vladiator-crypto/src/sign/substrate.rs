// Path: crates/vladiator-crypto/src/sign/substrate.rs
//! sr25519 signing for the optional Substrate driver variant.
//!
//! The canonical digest is the same keccak-256 of the ABI-encoded request
//! tuple; only the signature scheme differs from the EVM family.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use schnorrkel::{ExpansionMode, Keypair, MiniSecretKey, PublicKey as SrPublicKey, Signature as SrSignature};
use vladiator_api::crypto::{SerializableKey, Signature, SigningKey, SigningKeyPair, VerifyingKey};

const SIGNING_CONTEXT: &[u8] = b"vladiator-substrate-signing";

/// An sr25519 key pair.
pub struct SubstrateKeyPair(Keypair);

/// The sr25519 public half.
#[derive(Clone)]
pub struct SubstratePublicKey(SrPublicKey);

/// The sr25519 private half.
pub struct SubstratePrivateKey(Keypair);

/// An sr25519 signature.
#[derive(Clone)]
pub struct SubstrateSignature(SrSignature);

impl SubstrateKeyPair {
    /// Generates a fresh key pair.
    pub fn generate() -> Self {
        Self(Keypair::generate_with(OsRng))
    }

    /// Derives a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;
        Ok(Self(mini.expand_to_keypair(ExpansionMode::Ed25519)))
    }
}

impl SigningKeyPair for SubstrateKeyPair {
    type PublicKey = SubstratePublicKey;
    type PrivateKey = SubstratePrivateKey;
    type Signature = SubstrateSignature;

    fn public_key(&self) -> Self::PublicKey {
        SubstratePublicKey(self.0.public)
    }

    fn private_key(&self) -> Self::PrivateKey {
        SubstratePrivateKey(Keypair {
            public: self.0.public,
            secret: self.0.secret.clone(),
        })
    }

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        Ok(SubstrateSignature(
            self.0.sign_simple(SIGNING_CONTEXT, message),
        ))
    }
}

impl SigningKey for SubstratePrivateKey {
    type Signature = SubstrateSignature;

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        Ok(SubstrateSignature(
            self.0.sign_simple(SIGNING_CONTEXT, message),
        ))
    }
}

impl SerializableKey for SubstratePrivateKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.secret.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            })?;
        SubstrateKeyPair::from_seed(&seed).map(|kp| kp.private_key())
    }
}

impl VerifyingKey for SubstratePublicKey {
    type Signature = SubstrateSignature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError> {
        self.0
            .verify_simple(SIGNING_CONTEXT, message, &signature.0)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl SerializableKey for SubstratePublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        SrPublicKey::from_bytes(bytes)
            .map(SubstratePublicKey)
            .map_err(|e| CryptoError::Malformed(e.to_string()))
    }
}

impl SerializableKey for SubstrateSignature {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        SrSignature::from_bytes(bytes)
            .map(SubstrateSignature)
            .map_err(|e| CryptoError::Malformed(e.to_string()))
    }
}

impl Signature for SubstrateSignature {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let key = SubstrateKeyPair::generate();
        let digest = crate::algorithms::hash::keccak256(b"canonical tuple bytes");

        let sig = key.sign(&digest).unwrap();
        assert!(key.public_key().verify(&digest, &sig).is_ok());
    }

    #[test]
    fn from_seed_is_deterministic() {
        let seed = [7u8; 32];
        let key_a = SubstrateKeyPair::from_seed(&seed).unwrap();
        let key_b = SubstrateKeyPair::from_seed(&seed).unwrap();
        assert_eq!(
            key_a.public_key().to_bytes(),
            key_b.public_key().to_bytes()
        );
    }

    #[test]
    fn wrong_key_fails_verification() {
        let key_a = SubstrateKeyPair::generate();
        let key_b = SubstrateKeyPair::generate();
        let digest = crate::algorithms::hash::keccak256(b"message");

        let sig = key_a.sign(&digest).unwrap();
        assert!(key_b.public_key().verify(&digest, &sig).is_err());
    }
}
