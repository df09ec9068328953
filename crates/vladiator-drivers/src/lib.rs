// Path: crates/vladiator-drivers/src/lib.rs
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

//! # Vladiator Drivers
//!
//! Per-chain drivers (spec §4.1): connect to a chain's RPC, decode event
//! logs, and answer `populateMessage`/`isMessageValid`/`isMessageProcessed`/
//! `signTransactionData`/`getChainsig`/`getExsig` for a given chain family.

/// Authoritative event signatures and canonical signing payload encoding.
pub mod abi;
/// The `ChainDriver` trait and its error type, shared by every family.
pub mod driver;
/// Retry policy wrapping a driver's RPC calls: exponential backoff, bounded
/// attempts, `tracing::debug!` on each transient failure.
pub mod gateway;
/// The EVM-family driver (JSON-RPC over HTTP).
#[cfg(feature = "evm")]
pub mod evm;
/// The substrate-family driver (WebSocket RPC). Optional variant (spec §4.1).
#[cfg(feature = "substrate")]
pub mod substrate;

pub use driver::{CanonicalTuple, ChainDriver, DriverError};
/// The 256-bit integer type `CanonicalTuple::tx_id` is expressed in.
pub use ethers::types::U256;
