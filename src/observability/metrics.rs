//! Metrics collection and exposition.
//!
//! # Metrics
//! - `evaluator_requests_total` (counter): `/evaluate` responses by status
//! - `evaluator_request_duration_seconds` (histogram): end-to-end latency
//! - `evaluator_records_total` (counter): per-record outcomes
//! - `evaluator_engine_call_duration_seconds` (histogram): engine latency by result
//!
//! # Design Decisions
//! - Macros are no-ops until a recorder is installed, so tests need no setup
//! - Prometheus scrape endpoint on its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one completed `/evaluate` request.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("evaluator_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("evaluator_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one record (`ok`, `validation`, `remote_evaluation`, `output_parse`).
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("evaluator_records_total", "outcome" => outcome).increment(1);
}

/// Record one decision engine call.
pub fn record_engine_call(result: &'static str, start: Instant) {
    metrics::histogram!("evaluator_engine_call_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}
