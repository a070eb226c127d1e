//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_extractions_total` (counter): AI extraction calls by outcome
//! - `gateway_settlements_total` (counter): disbursements by path
//! - `gateway_dependency_health` (gauge): 1=healthy, 0=unhealthy per dependency
//! - `gateway_claims_stored_total` (counter): claim records written

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and start the scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(%addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request with its latency.
pub fn record_request(endpoint: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "endpoint" => endpoint.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Count an AI extraction attempt; `outcome` is "ok" or "error".
pub fn record_extraction(outcome: &'static str) {
    counter!("gateway_extractions_total", "outcome" => outcome).increment(1);
}

/// Count a broadcast disbursement; `path` is "contract" or "direct".
pub fn record_settlement(path: &'static str) {
    counter!("gateway_settlements_total", "path" => path).increment(1);
}

/// Publish dependency reachability as a 0/1 gauge.
pub fn record_dependency_health(name: &str, healthy: bool) {
    gauge!("gateway_dependency_health", "dependency" => name.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

/// Count a claim record write.
pub fn record_claim_stored() {
    counter!("gateway_claims_stored_total").increment(1);
}
