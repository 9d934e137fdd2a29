//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define relay metrics (sync outcomes, latency, reload exits, HTTP status)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `relay_sync_operations_total` (counter): apply/clear by outcome
//! - `relay_sync_duration_seconds` (histogram): render+write+reload latency
//! - `relay_reload_exit_total` (counter): reload exits by success
//! - `relay_http_requests_total` (counter): API requests by route, status
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and
//!   metrics-disabled deployments pay nothing
//! - Labels are low-cardinality: never keys or URLs

use std::net::SocketAddr;
use std::time::Instant;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished apply/clear.
pub fn record_sync(operation: &'static str, outcome: &'static str, start: Instant) {
    counter!("relay_sync_operations_total", "operation" => operation, "outcome" => outcome).increment(1);
    histogram!("relay_sync_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record a reload command exit.
pub fn record_reload(success: bool) {
    let label = if success { "true" } else { "false" };
    counter!("relay_reload_exit_total", "success" => label).increment(1);
}

/// Record an API response.
pub fn record_request(route: &'static str, status: u16) {
    counter!("relay_http_requests_total", "route" => route, "status" => status.to_string()).increment(1);
}
