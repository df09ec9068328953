// Path: crates/vladiator-test-utils/src/mock_sink.rs
//! Recording [`PublishSink`] and [`DriverLookup`] doubles for coordinator
//! integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vladiator_coordinator::{DriverLookup, PublishSink};
use vladiator_drivers::ChainDriver;
use vladiator_types::message::Message;

/// Records every frame published to it, in order, for later assertion.
#[derive(Default)]
pub struct RecordingSink {
    emitted: Mutex<Vec<Message>>,
}

impl RecordingSink {
    /// A sink with nothing recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every frame published so far, in publish order.
    pub fn emitted(&self) -> Vec<Message> {
        self.emitted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl PublishSink for RecordingSink {
    async fn publish(&self, message: Message) {
        self.emitted.lock().unwrap_or_else(|e| e.into_inner()).push(message);
    }
}

/// A static table of drivers keyed by chain id, standing in for the
/// orchestrator's driver table in coordinator-only tests.
#[derive(Default)]
pub struct MockDriverTable {
    drivers: HashMap<u64, Arc<dyn ChainDriver>>,
}

impl MockDriverTable {
    /// An empty table: every `driver_for` lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `driver` under its own `chain_id()`.
    pub fn with_driver(mut self, driver: Arc<dyn ChainDriver>) -> Self {
        self.drivers.insert(driver.chain_id(), driver);
        self
    }
}

impl DriverLookup for MockDriverTable {
    fn driver_for(&self, chain_id: u64) -> Option<Arc<dyn ChainDriver>> {
        self.drivers.get(&chain_id).cloned()
    }
}
