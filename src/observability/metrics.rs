//! Metrics collection and exposition.
//!
//! # Metrics
//! - `htmlnojs_proxy_requests_total` (counter): proxied requests by method, status
//! - `htmlnojs_proxy_request_duration_seconds` (histogram): proxy latency by method
//! - `htmlnojs_backend_unavailable_total` (counter): transport failures and timeouts
//! - `htmlnojs_backend_health` (gauge): 1=healthy, 0=unhealthy, last probe
//! - `htmlnojs_routes_registered` (gauge): routes by kind
//!
//! # Design Decisions
//! - Recording is always safe; without an installed recorder it does nothing
//! - The Prometheus exporter runs its own listener, off the request path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_proxy_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "htmlnojs_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "htmlnojs_proxy_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_unavailable() {
    metrics::counter!("htmlnojs_backend_unavailable_total").increment(1);
}

pub fn set_backend_health(healthy: bool) {
    metrics::gauge!("htmlnojs_backend_health").set(if healthy { 1.0 } else { 0.0 });
}

pub fn set_routes_registered(kind: &'static str, count: usize) {
    metrics::gauge!("htmlnojs_routes_registered", "kind" => kind).set(count as f64);
}
