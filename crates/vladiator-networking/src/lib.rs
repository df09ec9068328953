// Path: crates/vladiator-networking/src/lib.rs
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

//! # Vladiator Networking
//!
//! The gossip pub/sub message bus (spec §4.3): topic subscription, publish,
//! the 5-second `REQUEST`/`SIGNED` de-duplication window, and the 2-minute
//! heartbeat ticker, over a libp2p gossipsub overlay.

pub mod bus;
pub mod dedup;
pub mod traits;

pub use bus::GossipBus;
pub use dedup::RecentGossip;
pub use traits::{all_topics, Bus, BusError, LocalPeer};
