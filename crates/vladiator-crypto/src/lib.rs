// Path: crates/vladiator-crypto/src/lib.rs
//! # Vladiator Crypto Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Vladiator Cryptography
//!
//! The keccak256 canonical digest and the two signing schemes the chain
//! drivers need: secp256k1 personal-message signing for the EVM family and
//! sr25519 for the Substrate family. The node private key supplied at
//! startup is interpreted under whichever scheme the destination driver
//! requires; this crate does not itself choose one.

pub mod algorithms;
pub mod error;
pub mod sign;

#[cfg(test)]
mod tests {
    #[test]
    fn test_crypto_canary() {}
}
