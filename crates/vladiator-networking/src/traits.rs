// Path: crates/vladiator-networking/src/traits.rs
//! The [`Bus`] abstraction the orchestrator depends on, decoupled from libp2p.

use async_trait::async_trait;
use vladiator_types::message::{Message, Topic};

/// An error type for bus operations.
#[derive(thiserror::Error, Debug)]
pub enum BusError {
    /// The underlying transport failed to publish a frame.
    #[error("publish failed: {0}")]
    Publish(String),
    /// The bus could not be started (e.g. failed to bind a listen address).
    #[error("failed to start bus: {0}")]
    Startup(String),
    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

/// The local peer's identity, as reported by a running [`Bus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPeer {
    /// The libp2p peer id, base58-encoded.
    pub peer_id: String,
    /// Addresses this node is listening on.
    pub listen_addrs: Vec<String>,
}

/// The gossip pub/sub surface the orchestrator drives (spec §4.3).
///
/// An implementation owns subscription to [`Topic::ALL`], the 5-second
/// de-duplication window, and the 2-minute heartbeat ticker; callers only
/// publish frames and drain inbound ones.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Publishes a frame under its own `kind` topic.
    async fn publish(&self, message: Message) -> Result<(), BusError>;

    /// Blocks until the next frame survives de-duplication, or the bus closes.
    async fn recv(&self) -> Option<Message>;

    /// Returns this node's peer id and listen addresses.
    fn local_peer(&self) -> LocalPeer;

    /// Returns the number of currently connected peers.
    fn connected_peer_count(&self) -> usize;

    /// Stops the bus's background task(s). Idempotent: a second call after
    /// the swarm loop has already exited just returns immediately.
    async fn shutdown(&self);
}

/// All topics subscribed to at startup, re-exported for callers that only
/// depend on this crate.
pub fn all_topics() -> &'static [Topic] {
    &Topic::ALL
}
