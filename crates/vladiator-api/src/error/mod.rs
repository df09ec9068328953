// Path: crates/vladiator-api/src/error/mod.rs
//! Error types shared by the crypto trait surface.

use thiserror::Error;

/// Errors raised by key material handling and signing/verification.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A key or signature had the wrong length for its scheme.
    #[error("invalid key or signature length: expected {expected}, got {got}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        got: usize,
    },
    /// A key or signature could not be decoded from its byte encoding.
    #[error("malformed key or signature encoding: {0}")]
    Malformed(String),
    /// Signature verification failed.
    #[error("signature verification failed")]
    VerificationFailed,
    /// The underlying signing backend returned an error.
    #[error("signing backend error: {0}")]
    Backend(String),
}
