// Path: crates/vladiator-coordinator/src/context.rs
//! The narrow capability handle a coordinator needs from the orchestrator:
//! publish and destination-driver lookup, without a back-reference cycle
//! (spec §9's redesign note on the orchestrator-driver relationship).

use async_trait::async_trait;
use std::sync::Arc;
use vladiator_drivers::ChainDriver;
use vladiator_types::message::Message;

/// Publishes frames to the bus on the coordinator's behalf.
#[async_trait]
pub trait PublishSink: Send + Sync {
    /// Best-effort publish; the bus tolerates concurrent publishers (spec §5).
    async fn publish(&self, message: Message);
}

/// Looks up the driver serving a given destination chain id.
pub trait DriverLookup: Send + Sync {
    /// Returns the driver for `chain_id`, if this node loads one.
    fn driver_for(&self, chain_id: u64) -> Option<Arc<dyn ChainDriver>>;
}
