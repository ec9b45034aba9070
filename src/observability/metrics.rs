//! Metrics collection and exposition.
//!
//! # Metrics
//! - `elog_flushes_total` (counter): successful file flushes
//! - `elog_flushed_bytes_total` (counter): bytes appended to log files
//! - `elog_rotations_total` (counter): rotations by kind (time, size, create)
//! - `elog_write_failures_total` (counter): sink failures by kind
//! - `elog_tracking_entries_total` (counter): tracking entries by outcome

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Serve a Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_flush(bytes: usize) {
    counter!("elog_flushes_total").increment(1);
    counter!("elog_flushed_bytes_total").increment(bytes as u64);
}

pub fn record_rotation(kind: &'static str) {
    counter!("elog_rotations_total", "kind" => kind).increment(1);
}

pub fn record_write_failure(kind: &'static str) {
    counter!("elog_write_failures_total", "kind" => kind).increment(1);
}

pub fn record_tracking(outcome: &'static str) {
    counter!("elog_tracking_entries_total", "outcome" => outcome).increment(1);
}
