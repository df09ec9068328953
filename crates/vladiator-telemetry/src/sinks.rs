// Path: crates/vladiator-telemetry/src/sinks.rs
//! Abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured metrics sink, falling back
/// to a no-op implementation if [`prometheus::install`](crate::prometheus::install)
/// was never called.
pub fn metrics() -> &'static dyn MetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// A sink for metrics related to the gossip message bus.
pub trait NetworkMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the gauge for the current number of connected peers.
    fn inc_connected_peers(&self);
    /// Decrements the gauge for the current number of connected peers.
    fn dec_connected_peers(&self);
    /// Increments a counter for gossip messages received, labeled by topic.
    fn inc_gossip_messages_received(&self, topic: &str);
    /// Increments a counter for gossip frames dropped by the dedup window, labeled by topic.
    fn inc_dedup_dropped(&self, topic: &str);
    /// Increments a counter for heartbeats published.
    fn inc_heartbeats_published(&self);
}
impl NetworkMetricsSink for NopSink {
    fn inc_connected_peers(&self) {}
    fn dec_connected_peers(&self) {}
    fn inc_gossip_messages_received(&self, _topic: &str) {}
    fn inc_dedup_dropped(&self, _topic: &str) {}
    fn inc_heartbeats_published(&self) {}
}

/// A sink for metrics related to chain drivers (RPC calls, confirmation waits).
pub trait DriverMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of an RPC call, labeled by chain and method.
    fn observe_rpc_duration(&self, chain: &str, method: &str, duration_secs: f64);
    /// Increments a counter for RPC errors, labeled by chain and method.
    fn inc_rpc_error(&self, chain: &str, method: &str);
    /// Sets the gauge for the last block height observed on a chain.
    fn set_last_seen_block(&self, chain: &str, height: u64);
}
impl DriverMetricsSink for NopSink {
    fn observe_rpc_duration(&self, _chain: &str, _method: &str, _duration_secs: f64) {}
    fn inc_rpc_error(&self, _chain: &str, _method: &str) {}
    fn set_last_seen_block(&self, _chain: &str, _height: u64) {}
}

/// A sink for metrics related to the per-transaction request coordinator.
pub trait CoordinatorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for `MESSAGE:REQUEST` frames accepted into the state machine.
    fn inc_requests_locked(&self, chain: &str);
    /// Increments a counter for signatures emitted, labeled by destination chain.
    fn inc_signatures_emitted(&self, chain: &str);
    /// Increments a counter for `MESSAGE:INVALID` emissions.
    fn inc_invalid(&self, chain: &str);
    /// Increments a counter for `PENALTY:CHAINMISS` emissions.
    fn inc_chainmiss(&self, chain: &str);
    /// Increments a counter for requests dropped after exceeding the retry bound.
    fn inc_retries_exhausted(&self, chain: &str);
    /// Observes the wall-clock duration a `txId` held the *locked* state.
    fn observe_lock_duration(&self, chain: &str, duration_secs: f64);
}
impl CoordinatorMetricsSink for NopSink {
    fn inc_requests_locked(&self, _chain: &str) {}
    fn inc_signatures_emitted(&self, _chain: &str) {}
    fn inc_invalid(&self, _chain: &str) {}
    fn inc_chainmiss(&self, _chain: &str) {}
    fn inc_retries_exhausted(&self, _chain: &str) {}
    fn observe_lock_duration(&self, _chain: &str, _duration_secs: f64) {}
}

/// A sink for metrics related to feature plug-in dispatch.
pub trait FeatureMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of a feature's `process` call.
    fn observe_feature_latency(&self, feature_id: &str, duration_secs: f64);
    /// Increments a counter for feature processing failures.
    fn inc_feature_error(&self, feature_id: &str);
}
impl FeatureMetricsSink for NopSink {
    fn observe_feature_latency(&self, _feature_id: &str, _duration_secs: f64) {}
    fn inc_feature_error(&self, _feature_id: &str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a
/// single point of implementation for metrics backends like Prometheus.
pub trait MetricsSink:
    NetworkMetricsSink + DriverMetricsSink + CoordinatorMetricsSink + FeatureMetricsSink + ErrorMetricsSink
{
}

impl<T> MetricsSink for T where
    T: NetworkMetricsSink
        + DriverMetricsSink
        + CoordinatorMetricsSink
        + FeatureMetricsSink
        + ErrorMetricsSink
{
}
