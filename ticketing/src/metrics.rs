//! Metric descriptions and the Prometheus exporter.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `tickets.purchase.succeeded` - Purchases that moved units to sold
//! - `tickets.purchase.units` - Units sold
//! - `tickets.purchase.rejected{reason}` - Purchases refused, by error kind
//! - `tickets.availability.queries` - Availability lookups
//! - `ticket_store.purchase.unmatched` - Conditional updates that matched no row
//! - `http.requests{method,route,status}` - Completed HTTP requests
//!
//! ## Histograms
//! - `http.request.duration_seconds{method,route,status}` - Request latency

use crate::config::MetricsConfig;
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

/// Latency buckets for `*duration_seconds` histograms.
const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Register descriptions for every metric the service records.
///
/// Call once at startup, after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "tickets.purchase.succeeded",
        Unit::Count,
        "Purchases that moved units from available to sold"
    );
    describe_counter!("tickets.purchase.units", Unit::Count, "Ticket units sold");
    describe_counter!(
        "tickets.purchase.rejected",
        Unit::Count,
        "Purchases refused, labelled by reason"
    );
    describe_counter!(
        "tickets.availability.queries",
        Unit::Count,
        "Availability lookups served"
    );
    describe_counter!(
        "ticket_store.purchase.unmatched",
        Unit::Count,
        "Conditional purchase updates that matched no row"
    );
    describe_counter!("http.requests", Unit::Count, "Completed HTTP requests");
    describe_histogram!(
        "http.request.duration_seconds",
        Unit::Seconds,
        "HTTP request latency"
    );

    tracing::info!("Metrics registered");
}

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the address is invalid, the bucket configuration is
/// rejected or the listener cannot be bound.
pub fn install_exporter(config: &MetricsConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install()?;

    tracing::info!(address = %addr, "Prometheus exporter listening");
    register_metrics();
    Ok(())
}
