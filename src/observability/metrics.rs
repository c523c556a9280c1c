//! Metrics collection and exposition.
//!
//! # Metrics
//! - `batch_txs_signed_total` (counter): transactions signed
//! - `batch_txs_broadcast_total` (counter): broadcast attempts by result
//! - `batch_broadcast_duration_seconds` (histogram): submission latency
//! - `batch_reconciliations_total` (counter): remote sequence checks
//! - `batch_drift_aborts_total` (counter): pipelines stopped by drift
//! - `batch_pipelines_total` (counter): finished pipelines by outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_signed() {
    counter!("batch_txs_signed_total").increment(1);
}

pub fn record_broadcast(success: bool, elapsed: Duration) {
    let result = if success { "ok" } else { "error" };
    counter!("batch_txs_broadcast_total", "result" => result).increment(1);
    histogram!("batch_broadcast_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_reconciliation() {
    counter!("batch_reconciliations_total").increment(1);
}

pub fn record_drift_abort() {
    counter!("batch_drift_aborts_total").increment(1);
}

pub fn record_pipeline_outcome(outcome: &'static str) {
    counter!("batch_pipelines_total", "outcome" => outcome).increment(1);
}
