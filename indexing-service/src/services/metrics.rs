//! Metrics collection for indexing-service.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it again is a no-op.
pub fn init_metrics() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    // A concurrent caller may have won the race; its handle is equivalent.
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the outcome of one inbound notification: `submitted`, `rejected` or `failed`.
pub fn record_notification(outcome: &'static str) {
    counter!("indexing_notifications_total", "outcome" => outcome).increment(1);
}

/// Record a call to Google, by operation (`publish`, `get_metadata`, `token`) and status.
pub fn record_api_call(operation: &'static str, status: &'static str) {
    counter!(
        "indexing_api_calls_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}
