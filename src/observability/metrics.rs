//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (request counts, latency, reload outcomes)
//! - Expose a Prometheus-compatible metrics endpoint
//! - Track per-service and aggregate metrics
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): latency by method, service
//! - `gateway_reloads_total` (counter): reload attempts by outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels for method, service and status code; the histogram drops the
//!   status label to keep series cardinality down
//! - Unmatched requests are recorded against the pseudo-service "none"

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on the given address.
///
/// A failure to start the exporter is logged, not fatal: the gateway can
/// serve traffic without a metrics endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one completed (or refused) request.
pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "service" => service.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one configuration reload attempt.
pub fn record_reload(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("gateway_reloads_total", "outcome" => outcome).increment(1);
}
