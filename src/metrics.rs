//! Prometheus metrics for request and storage monitoring.
//!
//! This module provides metrics for:
//! - HTTP request counts and latency per route
//! - Storage operation latency and failures
//! - Accounts created

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Storage operation latency metric name.
pub const METRIC_STORAGE_OP_LATENCY: &str = "storage_op_latency_ms";
/// Storage errors counter metric name.
pub const METRIC_STORAGE_ERRORS: &str = "storage_errors_total";
/// Accounts created counter metric name.
pub const METRIC_ACCOUNTS_CREATED: &str = "accounts_created_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests handled");
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_STORAGE_OP_LATENCY,
        "Storage operation latency in milliseconds"
    );
    describe_counter!(
        METRIC_STORAGE_ERRORS,
        "Total number of failed storage operations"
    );
    describe_counter!(METRIC_ACCOUNTS_CREATED, "Total number of accounts created");

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and describe all metrics.
///
/// Can only succeed once per process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record a handled HTTP request.
pub fn record_http_request(method: &str, route: &str, status: u16, start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "route" => route.to_string()).record(latency_ms);
}

/// Increment storage errors counter.
pub fn inc_storage_errors(op: &'static str, kind: &'static str) {
    counter!(METRIC_STORAGE_ERRORS, "op" => op, "kind" => kind).increment(1);
}

/// Increment accounts created counter.
pub fn inc_accounts_created() {
    counter!(METRIC_ACCOUNTS_CREATED).increment(1);
}

/// RAII guard for timing storage operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    op: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given storage operation.
    pub fn new(op: &'static str) -> Self {
        Self {
            start: Instant::now(),
            op,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(METRIC_STORAGE_OP_LATENCY, "op" => self.op).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a storage operation.
pub fn timer_storage(op: &'static str) -> LatencyTimer {
    LatencyTimer::new(op)
}
