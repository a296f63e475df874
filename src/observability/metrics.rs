//! Metrics collection and exposition.
//!
//! # Metrics
//! - `epp_resolutions_total` (counter): resolution calls by outcome
//! - `epp_resolution_duration_seconds` (histogram): resolution latency
//! - `epp_internal_redirects_total` (counter): dispatch rewrites, by endpoint presence
//! - `gateway_requests_total` (counter): direct responses by status
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str, start: Instant) {
    counter!("epp_resolutions_total", "outcome" => outcome).increment(1);
    histogram!("epp_resolution_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_redirect(with_endpoint: bool) {
    let endpoint = if with_endpoint { "set" } else { "unset" };
    counter!("epp_internal_redirects_total", "endpoint" => endpoint).increment(1);
}

pub fn record_response(status: u16) {
    counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
}
