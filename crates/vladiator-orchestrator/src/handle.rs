// Path: crates/vladiator-orchestrator/src/handle.rs
//! The narrow capability each [`Coordinator`](vladiator_coordinator::Coordinator)
//! is given instead of a back-reference to the orchestrator (spec §9: "the
//! orchestrator and its drivers should not hold references to each other").

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use vladiator_coordinator::{DriverLookup, PublishSink};
use vladiator_drivers::ChainDriver;
use vladiator_networking::Bus;
use vladiator_types::message::Message;

/// Wraps the shared driver table and the bus so a coordinator can look up a
/// peer driver or publish a frame without knowing about the orchestrator.
pub struct Handle {
    drivers: HashMap<u64, Arc<dyn ChainDriver>>,
    bus: Arc<dyn Bus>,
}

impl Handle {
    /// Builds a handle over `drivers` (keyed by chain id) and `bus`.
    pub fn new(drivers: HashMap<u64, Arc<dyn ChainDriver>>, bus: Arc<dyn Bus>) -> Self {
        Self { drivers, bus }
    }

    /// Returns the driver table this handle was built with, for callers that
    /// need to enumerate chains rather than look one up.
    pub fn drivers(&self) -> &HashMap<u64, Arc<dyn ChainDriver>> {
        &self.drivers
    }
}

impl DriverLookup for Handle {
    fn driver_for(&self, chain_id: u64) -> Option<Arc<dyn ChainDriver>> {
        self.drivers.get(&chain_id).cloned()
    }
}

#[async_trait]
impl PublishSink for Handle {
    async fn publish(&self, message: Message) {
        if let Err(e) = self.bus.publish(message).await {
            tracing::warn!(target: "orchestrator", error = %e, "failed to publish frame");
        }
    }
}
