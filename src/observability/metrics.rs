//! Metrics collection and exposition.
//!
//! # Metrics
//! - `qr_requests_total` (counter): requests by route and status
//! - `qr_request_duration_seconds` (histogram): latency by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "qr_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("qr_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
