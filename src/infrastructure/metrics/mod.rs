//! Prometheus Metrics Module
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Open gateway connections, split into connected/identified
//! - Follow/unfollow mutations, split by whether the edge changed

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "social_graph";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("valid HTTP_REQUESTS_TOTAL definition")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("valid HTTP_REQUEST_DURATION_SECONDS definition")
});

/// Open gateway connections
pub static GATEWAY_CONNECTIONS_ACTIVE: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new(
            "gateway_connections_active",
            "Number of open gateway connections",
        )
        .namespace(NAMESPACE),
        &["state"], // "connected", "identified"
    )
    .expect("valid GATEWAY_CONNECTIONS_ACTIVE definition")
});

/// Follow graph mutations
pub static FOLLOW_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("follow_mutations_total", "Follow and unfollow operations").namespace(NAMESPACE),
        &["operation", "changed"],
    )
    .expect("valid FOLLOW_MUTATIONS_TOTAL definition")
});

fn register_metrics(registry: &Registry) {
    let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
        Box::new(GATEWAY_CONNECTIONS_ACTIVE.clone()),
        Box::new(FOLLOW_MUTATIONS_TOTAL.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record a follow/unfollow call. `changed` is false for a no-op.
pub fn record_follow_mutation(operation: &str, changed: bool) {
    FOLLOW_MUTATIONS_TOTAL
        .with_label_values(&[operation, if changed { "true" } else { "false" }])
        .inc();
}

/// Helper to update gateway connection counts
pub fn set_gateway_connections(connected: usize, identified: usize) {
    GATEWAY_CONNECTIONS_ACTIVE
        .with_label_values(&["connected"])
        .set(connected as f64);
    GATEWAY_CONNECTIONS_ACTIVE
        .with_label_values(&["identified"])
        .set(identified as f64);
}
