//! Prometheus metrics for the HTTP API.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counter of API operations, labelled by `op`.
pub const CATALOG_OPERATIONS: &str = "folio_catalog_operations_total";

/// Count one API operation.
pub fn record_catalog_operation(op: &'static str) {
    ::metrics::counter!(CATALOG_OPERATIONS, "op" => op).increment(1);
}

/// Install the global Prometheus recorder and return its render handle.
///
/// # Errors
///
/// Returns an error if a global recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}
