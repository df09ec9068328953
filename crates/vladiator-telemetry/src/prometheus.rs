// Path: crates/vladiator-telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_gauge_vec, register_int_counter_vec,
    register_histogram_vec, Gauge, GaugeVec, HistogramVec, IntCounterVec,
};

static NETWORK_CONNECTED_PEERS: OnceCell<Gauge> = OnceCell::new();
static NETWORK_GOSSIP_MESSAGES_RECEIVED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static NETWORK_DEDUP_DROPPED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static NETWORK_HEARTBEATS_PUBLISHED_TOTAL: OnceCell<prometheus::IntCounter> = OnceCell::new();

static DRIVER_RPC_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static DRIVER_RPC_ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static DRIVER_LAST_SEEN_BLOCK: OnceCell<GaugeVec> = OnceCell::new();

static COORDINATOR_REQUESTS_LOCKED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COORDINATOR_SIGNATURES_EMITTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COORDINATOR_INVALID_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COORDINATOR_CHAINMISS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COORDINATOR_RETRIES_EXHAUSTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static COORDINATOR_LOCK_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();

static FEATURE_DISPATCH_LATENCY_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static FEATURE_ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// This will panic if `install()` has not been called, which is intentional
/// as it indicates a critical application setup error.
macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("Prometheus sink not initialized. Call telemetry::prometheus::install() first.")
    };
}

impl NetworkMetricsSink for PrometheusSink {
    fn inc_connected_peers(&self) {
        get_metric!(NETWORK_CONNECTED_PEERS).inc();
    }
    fn dec_connected_peers(&self) {
        get_metric!(NETWORK_CONNECTED_PEERS).dec();
    }
    fn inc_gossip_messages_received(&self, topic: &str) {
        get_metric!(NETWORK_GOSSIP_MESSAGES_RECEIVED_TOTAL)
            .with_label_values(&[topic])
            .inc();
    }
    fn inc_dedup_dropped(&self, topic: &str) {
        get_metric!(NETWORK_DEDUP_DROPPED_TOTAL)
            .with_label_values(&[topic])
            .inc();
    }
    fn inc_heartbeats_published(&self) {
        get_metric!(NETWORK_HEARTBEATS_PUBLISHED_TOTAL).inc();
    }
}

impl DriverMetricsSink for PrometheusSink {
    fn observe_rpc_duration(&self, chain: &str, method: &str, duration_secs: f64) {
        get_metric!(DRIVER_RPC_DURATION_SECONDS)
            .with_label_values(&[chain, method])
            .observe(duration_secs);
    }
    fn inc_rpc_error(&self, chain: &str, method: &str) {
        get_metric!(DRIVER_RPC_ERRORS_TOTAL)
            .with_label_values(&[chain, method])
            .inc();
    }
    fn set_last_seen_block(&self, chain: &str, height: u64) {
        get_metric!(DRIVER_LAST_SEEN_BLOCK)
            .with_label_values(&[chain])
            .set(height as f64);
    }
}

impl CoordinatorMetricsSink for PrometheusSink {
    fn inc_requests_locked(&self, chain: &str) {
        get_metric!(COORDINATOR_REQUESTS_LOCKED_TOTAL)
            .with_label_values(&[chain])
            .inc();
    }
    fn inc_signatures_emitted(&self, chain: &str) {
        get_metric!(COORDINATOR_SIGNATURES_EMITTED_TOTAL)
            .with_label_values(&[chain])
            .inc();
    }
    fn inc_invalid(&self, chain: &str) {
        get_metric!(COORDINATOR_INVALID_TOTAL)
            .with_label_values(&[chain])
            .inc();
    }
    fn inc_chainmiss(&self, chain: &str) {
        get_metric!(COORDINATOR_CHAINMISS_TOTAL)
            .with_label_values(&[chain])
            .inc();
    }
    fn inc_retries_exhausted(&self, chain: &str) {
        get_metric!(COORDINATOR_RETRIES_EXHAUSTED_TOTAL)
            .with_label_values(&[chain])
            .inc();
    }
    fn observe_lock_duration(&self, chain: &str, duration_secs: f64) {
        get_metric!(COORDINATOR_LOCK_DURATION_SECONDS)
            .with_label_values(&[chain])
            .observe(duration_secs);
    }
}

impl FeatureMetricsSink for PrometheusSink {
    fn observe_feature_latency(&self, feature_id: &str, duration_secs: f64) {
        get_metric!(FEATURE_DISPATCH_LATENCY_SECONDS)
            .with_label_values(&[feature_id])
            .observe(duration_secs);
    }
    fn inc_feature_error(&self, feature_id: &str) {
        get_metric!(FEATURE_ERRORS_TOTAL)
            .with_label_values(&[feature_id])
            .inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL)
            .with_label_values(&[kind, variant])
            .inc();
    }
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    NETWORK_CONNECTED_PEERS
        .set(register_gauge!(
            "vladiator_networking_connected_peers",
            "Current number of connected libp2p peers."
        )?)
        .expect("static already initialized");
    NETWORK_GOSSIP_MESSAGES_RECEIVED_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_networking_gossip_messages_received_total",
            "Total gossip messages received, by topic.",
            &["topic"]
        )?)
        .expect("static already initialized");
    NETWORK_DEDUP_DROPPED_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_networking_dedup_dropped_total",
            "Total gossip frames dropped by the 5-second dedup window, by topic.",
            &["topic"]
        )?)
        .expect("static already initialized");
    NETWORK_HEARTBEATS_PUBLISHED_TOTAL
        .set(prometheus::register_int_counter!(
            "vladiator_networking_heartbeats_published_total",
            "Total heartbeat frames published by this node."
        )?)
        .expect("static already initialized");
    DRIVER_RPC_DURATION_SECONDS
        .set(register_histogram_vec!(
            "vladiator_driver_rpc_duration_seconds",
            "Latency of chain RPC calls, by chain and method.",
            &["chain", "method"],
            exponential_buckets(0.005, 2.0, 15)?
        )?)
        .expect("static already initialized");
    DRIVER_RPC_ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_driver_rpc_errors_total",
            "Total chain RPC call errors, by chain and method.",
            &["chain", "method"]
        )?)
        .expect("static already initialized");
    DRIVER_LAST_SEEN_BLOCK
        .set(register_gauge_vec!(
            "vladiator_driver_last_seen_block",
            "Most recent block height observed on a chain.",
            &["chain"]
        )?)
        .expect("static already initialized");
    COORDINATOR_REQUESTS_LOCKED_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_coordinator_requests_locked_total",
            "Total MESSAGE:REQUEST frames accepted into the state machine, by destination chain.",
            &["chain"]
        )?)
        .expect("static already initialized");
    COORDINATOR_SIGNATURES_EMITTED_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_coordinator_signatures_emitted_total",
            "Total MESSAGE:SIGNED frames emitted, by destination chain.",
            &["chain"]
        )?)
        .expect("static already initialized");
    COORDINATOR_INVALID_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_coordinator_invalid_total",
            "Total MESSAGE:INVALID frames emitted, by destination chain.",
            &["chain"]
        )?)
        .expect("static already initialized");
    COORDINATOR_CHAINMISS_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_coordinator_chainmiss_total",
            "Total PENALTY:CHAINMISS frames emitted, by destination chain.",
            &["chain"]
        )?)
        .expect("static already initialized");
    COORDINATOR_RETRIES_EXHAUSTED_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_coordinator_retries_exhausted_total",
            "Total requests dropped after exceeding the retry bound, by destination chain.",
            &["chain"]
        )?)
        .expect("static already initialized");
    COORDINATOR_LOCK_DURATION_SECONDS
        .set(register_histogram_vec!(
            "vladiator_coordinator_lock_duration_seconds",
            "Wall-clock duration a txId held the locked state, by destination chain.",
            &["chain"],
            exponential_buckets(0.01, 2.0, 15)?
        )?)
        .expect("static already initialized");
    FEATURE_DISPATCH_LATENCY_SECONDS
        .set(register_histogram_vec!(
            "vladiator_feature_dispatch_latency_seconds",
            "Latency of a feature plug-in's process call, by feature id.",
            &["feature_id"],
            exponential_buckets(0.001, 2.0, 15)?
        )?)
        .expect("static already initialized");
    FEATURE_ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_feature_errors_total",
            "Total feature plug-in processing failures, by feature id.",
            &["feature_id"]
        )?)
        .expect("static already initialized");
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "vladiator_errors_total",
            "Total number of errors, categorized by kind and variant.",
            &["kind", "variant"]
        )?)
        .expect("static already initialized");

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
