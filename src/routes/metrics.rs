//! Prometheus metrics endpoint
//!
//! Exposes relay metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    let _ = &*PROMETHEUS_HANDLE;

    metrics::describe_counter!(
        "relay_requests_total",
        "Chat completion requests by outcome"
    );
    metrics::describe_histogram!(
        "relay_request_duration_seconds",
        "Time until the response (or error) was handed to the client"
    );
    metrics::describe_counter!("relay_streams_total", "Finished streams by outcome");
    metrics::describe_counter!(
        "relay_stream_deltas_total",
        "Text deltas forwarded to clients"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a chat completion request
pub fn record_request(outcome: &str, duration_secs: f64) {
    metrics::counter!("relay_requests_total", "outcome" => outcome.to_string()).increment(1);
    metrics::histogram!("relay_request_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}

/// Record a stream reaching its end
pub fn record_stream(outcome: &str, deltas: u64) {
    metrics::counter!("relay_streams_total", "outcome" => outcome.to_string()).increment(1);
    metrics::counter!("relay_stream_deltas_total").increment(deltas);
}
