//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): initial-phase outcomes by result and
//!   denial code
//! - `gate_throttled_wait_seconds` (histogram): required wait on throttled
//!   requests

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a request that passed the initial phase.
pub fn record_gate_allowed() {
    counter!("gate_requests_total", "result" => "allowed").increment(1);
}

/// Record a request denied by the initial phase.
pub fn record_gate_denied(code: &str) {
    counter!("gate_requests_total", "result" => "denied", "code" => code.to_string()).increment(1);
}

/// Record the wait imposed on a throttled request.
pub fn record_throttle_wait(wait: Duration) {
    histogram!("gate_throttled_wait_seconds").record(wait.as_secs_f64());
}
