//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_decisions_total` (counter): decisions by route category and outcome
//! - `gateway_rate_limited_total` (counter): requests rejected by the rate guard
//! - `gateway_rate_limit_keys` (gauge): client keys currently tracked
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic increments)
//! - Prometheus exposition on a separate listener

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RouteCategory;
use crate::security::rate_limit::RateLimitStore;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one gateway decision.
pub fn record_decision(category: RouteCategory, outcome: &'static str) {
    metrics::counter!(
        "gateway_decisions_total",
        "category" => category.as_str(),
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record one request rejected by the rate guard.
pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

/// Report how many client keys the rate store is tracking.
pub fn record_tracked_keys(store: &Arc<dyn RateLimitStore>) {
    metrics::gauge!("gateway_rate_limit_keys").set(store.tracked_keys() as f64);
}
