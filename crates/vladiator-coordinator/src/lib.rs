// Path: crates/vladiator-coordinator/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Vladiator Coordinator
//!
//! The per-transaction request state machine (spec §4.2): lock → populate →
//! validate → feature → sign → publish, with at-most-once signing and
//! idempotent replay of cached signatures.
//!
//! The end-to-end scenarios from spec §8 live in `tests/integration.rs`,
//! driven against `vladiator-test-utils::MockChainDriver`; this crate's own
//! `#[cfg(test)]` modules only cover the pure cache-transition logic.

/// The `SignatureCache`/`RetryCounter`/`FeatureReplyCache` data structures.
pub mod cache;
/// The narrow publish/driver-lookup capability a coordinator depends on.
pub mod context;
/// The `Coordinator` state machine itself.
pub mod coordinator;

pub use cache::{RetryCounter, SignatureCache, TxState};
pub use context::{DriverLookup, PublishSink};
pub use coordinator::Coordinator;
