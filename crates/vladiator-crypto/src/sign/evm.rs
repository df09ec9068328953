// Path: crates/vladiator-crypto/src/sign/evm.rs
//! secp256k1 personal-message signing for the EVM driver family.
//!
//! The node is handed a single 32-byte canonical digest (the keccak-256 of
//! the ABI-encoded request tuple) and must sign it the same way
//! `personal_sign` does, so that the destination contract's `ecrecover`
//! call recovers the correct signer address.

use crate::error::CryptoError;
use ethers::core::types::{Address, Signature as EthSignature, H256};
use ethers::core::utils::hash_message;
use ethers::signers::{LocalWallet, Signer};
use std::str::FromStr;
use vladiator_api::crypto::{SerializableKey, Signature, SigningKey, SigningKeyPair, VerifyingKey};

/// A secp256k1 key pair for the EVM driver family.
#[derive(Clone)]
pub struct EvmKeyPair(LocalWallet);

/// The public half: an EVM address, not a raw curve point.
///
/// Chain contracts authorize by address, not by public key, so this is the
/// only representation the rest of the system ever needs.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EvmPublicKey(Address);

/// The private half, kept only long enough to construct a signer.
#[derive(Clone)]
pub struct EvmPrivateKey(LocalWallet);

/// A 65-byte `(r, s, v)` recoverable ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EvmSignature(EthSignature);

impl EvmKeyPair {
    /// Builds a key pair from a hex-encoded private key, with or without a `0x` prefix.
    pub fn from_hex(secret_hex: &str) -> Result<Self, CryptoError> {
        let wallet = LocalWallet::from_str(secret_hex.trim_start_matches("0x"))
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;
        Ok(Self(wallet))
    }

    /// The address this key pair signs as.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Signs a 32-byte digest with `personal_sign` framing.
    ///
    /// This is the single operation the canonical signing payload (spec §4.1,
    /// §6) requires: the digest itself must already be
    /// `keccak256(abiEncode(...))`; this function only adds the
    /// `"\x19Ethereum Signed Message:\n32"` prefix and the outer keccak256
    /// before the ECDSA signature.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Result<EvmSignature, CryptoError> {
        let framed: H256 = hash_message(digest);
        let sig = self
            .0
            .sign_hash(framed)
            .map_err(|e| CryptoError::Backend(e.to_string()))?;
        Ok(EvmSignature(sig))
    }
}

impl SigningKeyPair for EvmKeyPair {
    type PublicKey = EvmPublicKey;
    type PrivateKey = EvmPrivateKey;
    type Signature = EvmSignature;

    fn public_key(&self) -> Self::PublicKey {
        EvmPublicKey(self.0.address())
    }

    fn private_key(&self) -> Self::PrivateKey {
        EvmPrivateKey(self.0.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        let digest: [u8; 32] = message
            .try_into()
            .map_err(|_| CryptoError::InvalidLength {
                expected: 32,
                got: message.len(),
            })?;
        self.sign_digest(digest)
    }
}

impl SigningKey for EvmPrivateKey {
    type Signature = EvmSignature;

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        EvmKeyPair(self.0.clone()).sign(message)
    }
}

impl SerializableKey for EvmPrivateKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.signer().to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let wallet =
            LocalWallet::from_bytes(bytes).map_err(|e| CryptoError::Malformed(e.to_string()))?;
        Ok(EvmPrivateKey(wallet))
    }
}

impl VerifyingKey for EvmPublicKey {
    type Signature = EvmSignature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError> {
        let digest: [u8; 32] = message
            .try_into()
            .map_err(|_| CryptoError::InvalidLength {
                expected: 32,
                got: message.len(),
            })?;
        let recovered = signature
            .0
            .recover(hash_message(digest))
            .map_err(|_| CryptoError::VerificationFailed)?;
        if recovered == self.0 {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailed)
        }
    }
}

impl SerializableKey for EvmPublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 20 {
            return Err(CryptoError::InvalidLength {
                expected: 20,
                got: bytes.len(),
            });
        }
        Ok(EvmPublicKey(Address::from_slice(bytes)))
    }
}

impl EvmPublicKey {
    /// The address this key represents.
    pub fn address(&self) -> Address {
        self.0
    }
}

impl SerializableKey for EvmSignature {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        EthSignature::try_from(bytes)
            .map(EvmSignature)
            .map_err(|e| CryptoError::Malformed(e.to_string()))
    }
}

impl Signature for EvmSignature {}

impl EvmSignature {
    /// The `0x`-prefixed hex encoding used on the wire (spec §3).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EvmKeyPair {
        EvmKeyPair::from_hex(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap()
    }

    #[test]
    fn sign_then_recover_round_trips() {
        let key = test_key();
        let digest = crate::algorithms::hash::keccak256(b"canonical tuple bytes");

        let sig = key.sign_digest(digest).unwrap();
        let public = key.public_key();
        assert!(public.verify(&digest, &sig).is_ok());
    }

    #[test]
    fn signing_is_deterministic_for_a_fixed_key() {
        let key = test_key();
        let digest = crate::algorithms::hash::keccak256(b"repeat me");

        let sig_a = key.sign_digest(digest).unwrap();
        let sig_b = key.sign_digest(digest).unwrap();
        assert_eq!(sig_a.to_bytes(), sig_b.to_bytes());
    }

    #[test]
    fn tampered_digest_fails_verification() {
        let key = test_key();
        let digest = crate::algorithms::hash::keccak256(b"original");
        let tampered = crate::algorithms::hash::keccak256(b"tampered");

        let sig = key.sign_digest(digest).unwrap();
        assert!(key.public_key().verify(&tampered, &sig).is_err());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let key_a = test_key();
        let key_b = EvmKeyPair::from_hex(
            "0xe2ff39dfaaf5a38afe7828e1f64bae6e3a76f0ebcaa3e2c6628ca1baf7af0486",
        )
        .unwrap();
        let digest = crate::algorithms::hash::keccak256(b"message");

        let sig = key_a.sign_digest(digest).unwrap();
        assert!(key_b.public_key().verify(&digest, &sig).is_err());
    }
}
