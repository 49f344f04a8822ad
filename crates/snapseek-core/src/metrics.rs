//! Prometheus metrics helpers.
//!
//! Both binaries record through the `metrics` facade. Without an installed
//! recorder every call is a no-op, so library code records unconditionally.
//!
//! # Metric Naming Conventions
//!
//! - Prefix: pipeline or component (`ingest_`, `search_`, `index_`)
//! - Suffix: unit or type (`_total`, `_seconds`)
//! - Labels: only low-cardinality values (source name, HTTP method, reason)

use std::net::SocketAddr;

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counters recorded by the pipelines, with their help text.
pub const COUNTERS: &[(&str, &str)] = &[
    (
        "ingest_records_total",
        "Storage event records received by the ingestion pipeline",
    ),
    (
        "ingest_records_indexed_total",
        "Records whose document was upserted into the index",
    ),
    (
        "ingest_records_failed_total",
        "Records that could not be indexed (batch continued)",
    ),
    (
        "ingest_label_source_degraded_total",
        "Label source failures degraded to an empty label set (label: source)",
    ),
    ("search_requests_total", "Search requests received"),
    (
        "search_labels_fallback_total",
        "Searches that used the fallback tokenizer (label: reason)",
    ),
    (
        "search_short_circuit_total",
        "Searches answered empty without querying the index",
    ),
    (
        "search_failures_total",
        "Searches answered with HTTP 500 after an index failure",
    ),
    (
        "index_requests_total",
        "Signed requests sent to the index service (label: method)",
    ),
    (
        "index_request_errors_total",
        "Index requests that failed (label: method)",
    ),
];

/// Histograms recorded by the index client.
pub const HISTOGRAMS: &[(&str, &str)] = &[(
    "index_request_duration_seconds",
    "Wall time of signed index requests, including signing",
)];

/// Install the global Prometheus recorder and describe all metrics.
///
/// Returns `None` if a recorder is already installed in this process.
pub fn install_recorder() -> Option<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder().ok()?;
    describe_metrics();
    Some(handle)
}

/// Install the recorder and serve `/metrics` on `port` from a background task.
///
/// The listener is bound before returning so that a port conflict is
/// reported to the caller.
pub async fn serve_metrics(port: u16) -> std::io::Result<()> {
    let Some(handle) = install_recorder() else {
        tracing::warn!("metrics recorder already installed, not starting exporter");
        return Ok(());
    };

    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics exporter listening");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

fn describe_metrics() {
    for (name, help) in COUNTERS {
        describe_counter!(*name, *help);
    }
    for (name, help) in HISTOGRAMS {
        describe_histogram!(*name, *help);
    }
}
