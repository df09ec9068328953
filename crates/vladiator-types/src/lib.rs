// Path: crates/vladiator-types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Vladiator Types
//!
//! The foundational crate for the Vladiator validator engine: the gossip
//! `Message` frame, per-network configuration, and the error enums shared by
//! every other crate in the workspace.
//!
//! ## Architectural role
//!
//! As the base crate, `vladiator-types` has minimal dependencies and is a
//! dependency of almost every other crate here. This prevents circular
//! dependencies and gives a single, canonical definition of the wire frame.

/// The heartbeat sentinel source id, reserved on the wire (spec §3, §4.3).
pub const HEARTBEAT_SOURCE: u64 = 1_010_101_010;

/// The gossip message frame and its constituent value types.
pub mod message;

/// Per-network configuration and environment variable handling.
pub mod config;

/// A small set of shared, non-consensus-critical error enums.
pub mod error;

/// A curated set of commonly used extension traits.
pub mod prelude;
