// Path: crates/vladiator-orchestrator/src/sinks.rs
//! Observability tap points for out-of-scope collaborators (spec §1, §4.4):
//! the chat notification sink and the WebSocket data-stream broadcaster are
//! not implemented here, but every inbound frame is still offered to
//! whatever sinks are registered before routing.

use async_trait::async_trait;
use vladiator_types::message::Message;

/// Receives every gossip frame the orchestrator ingests, before routing.
#[async_trait]
pub trait ObservabilitySink: Send + Sync {
    /// Offers `message` to this sink. Sinks filter internally; a sink that
    /// is not interested in a given topic simply returns without acting.
    async fn send(&self, message: &Message);
}

/// Discards every frame. Useful as a default when no external sink is wired.
pub struct NopSink;

#[async_trait]
impl ObservabilitySink for NopSink {
    async fn send(&self, _message: &Message) {}
}

/// Logs every frame at debug level via `tracing`, standing in for the chat
/// and data-stream collaborators spec.md §1 scopes out of this crate.
pub struct LoggingSink;

#[async_trait]
impl ObservabilitySink for LoggingSink {
    async fn send(&self, message: &Message) {
        tracing::debug!(
            target: "orchestrator",
            kind = %message.kind,
            author = %message.author,
            source = %message.source,
            transaction_hash = %message.transaction_hash,
            "observed gossip frame"
        );
    }
}
