//! Metrics collection and exposition.
//!
//! # Metrics
//! - `staging_ensure_total` (counter): readiness creates, by outcome
//! - `staging_teardown_total` (counter): tear-down attempts, by outcome
//! - `uploads_staged_total` (counter): files written to the staging directory
//! - `upload_bytes_total` (counter): bytes written to the staging directory
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_ensure(outcome: &'static str) {
    metrics::counter!("staging_ensure_total", "outcome" => outcome).increment(1);
}

pub fn record_teardown(outcome: &'static str) {
    metrics::counter!("staging_teardown_total", "outcome" => outcome).increment(1);
}

/// Record one staged upload of `bytes` bytes.
pub fn record_upload(bytes: u64) {
    metrics::counter!("uploads_staged_total").increment(1);
    metrics::counter!("upload_bytes_total").increment(bytes);
}
