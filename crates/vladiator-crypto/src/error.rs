// Path: crates/vladiator-crypto/src/error.rs
//! Local error types for the `vladiator-crypto` crate.

// Re-export the canonical error type from the API crate.
pub use vladiator_api::error::CryptoError;
