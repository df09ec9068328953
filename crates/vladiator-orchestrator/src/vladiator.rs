// Path: crates/vladiator-orchestrator/src/vladiator.rs
//! The top-level composition root (spec §4.4): wires the bus, the driver
//! table, the feature registry, and one [`Coordinator`] per source chain
//! into a single ingress loop.

use crate::handle::Handle;
use crate::sinks::ObservabilitySink;
use std::collections::HashMap;
use std::sync::Arc;
use vladiator_coordinator::{Coordinator, PublishSink};
use vladiator_drivers::ChainDriver;
use vladiator_features::Registry;
use vladiator_networking::Bus;
use vladiator_types::message::{ChainId, Topic};

/// Runs the gossip ingress loop until the bus closes: tap every frame to the
/// registered observability sinks, then route `MESSAGE:REQUEST` frames to
/// the coordinator for their claimed source chain, penalizing unknown
/// non-heartbeat sources (spec §4.4).
pub struct Vladiator {
    bus: Arc<dyn Bus>,
    handle: Arc<Handle>,
    coordinators: HashMap<u64, Arc<Coordinator>>,
    sinks: Vec<Arc<dyn ObservabilitySink>>,
    author: String,
}

impl Vladiator {
    /// Builds one [`Coordinator`] per entry in `drivers`, each sharing the
    /// same [`Handle`] over the full driver table so that a source-chain
    /// coordinator can still sign against a different destination chain.
    pub fn new(
        bus: Arc<dyn Bus>,
        drivers: Vec<Arc<dyn ChainDriver>>,
        features: Arc<Registry>,
        author: String,
        sinks: Vec<Arc<dyn ObservabilitySink>>,
    ) -> Self {
        let table: HashMap<u64, Arc<dyn ChainDriver>> = drivers
            .iter()
            .map(|d| (d.chain_id(), d.clone()))
            .collect();
        let handle = Arc::new(Handle::new(table, bus.clone()));

        let coordinators = drivers
            .into_iter()
            .map(|driver| {
                let chain_id = driver.chain_id();
                let coordinator = Coordinator::new(
                    driver,
                    handle.clone(),
                    features.clone(),
                    handle.clone(),
                    author.clone(),
                );
                (chain_id, Arc::new(coordinator))
            })
            .collect();

        Self {
            bus,
            handle,
            coordinators,
            sinks,
            author,
        }
    }

    /// Drains the bus until it closes, dispatching every `MESSAGE:REQUEST`
    /// to its source chain's coordinator on its own task so a slow RPC
    /// driver on one chain never stalls ingress for the others.
    pub async fn run(self: Arc<Self>) {
        while let Some(message) = self.bus.recv().await {
            self.dispatch(message).await;
        }
        tracing::info!(target: "orchestrator", "bus closed; ingress loop exiting");
    }

    async fn dispatch(&self, message: vladiator_types::message::Message) {
        for sink in &self.sinks {
            sink.send(&message).await;
        }

        if message.kind != Topic::MessageRequest {
            return;
        }

        match self.coordinators.get(&message.source.0) {
            Some(coordinator) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    coordinator.process_request(message).await;
                });
            }
            None if message.source.is_heartbeat() => {
                tracing::warn!(
                    target: "orchestrator",
                    "dropping MESSAGE:REQUEST claiming the heartbeat sentinel as its source"
                );
            }
            None => {
                tracing::debug!(
                    target: "orchestrator",
                    source = %message.source,
                    "no driver for requested source chain"
                );
                let mut penalty = message;
                penalty.kind = Topic::PenaltyChainMiss;
                penalty.author = self.author.clone();
                self.handle.publish(penalty).await;
            }
        }
    }

    /// The chain ids this node has a driver for.
    pub fn known_chains(&self) -> Vec<ChainId> {
        self.handle.drivers().keys().copied().map(ChainId).collect()
    }

    /// Stops the underlying bus, then waits for any in-flight coordinator
    /// tasks this call spawned to have been handed off (fire-and-forget by
    /// design; this only guarantees the transport itself has quiesced).
    pub async fn shutdown(&self) {
        self.bus.shutdown().await;
    }
}
