//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_proxy_requests_total` (counter): proxied requests by method, service, status
//! - `gateway_proxy_request_duration_seconds` (histogram): latency by service
//! - `gateway_authorization_total` (counter): authorization decisions by outcome
//! - `gateway_token_exchange_total` (counter): token exchanges by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality: service names come from the static registry
//!   and extension methods collapse to `other`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Bounded label for a request method.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "other",
    }
}

pub fn record_proxy_request(method: &'static str, service: &str, status: u16, start: Instant) {
    counter!(
        "gateway_proxy_requests_total",
        "method" => method,
        "service" => service.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_proxy_request_duration_seconds",
        "service" => service.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_authorization(allowed: bool) {
    let outcome = if allowed { "allowed" } else { "denied" };
    counter!("gateway_authorization_total", "outcome" => outcome).increment(1);
}

pub fn record_token_exchange(outcome: &'static str) {
    counter!("gateway_token_exchange_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label_is_bounded() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::DELETE), "DELETE");

        let custom = Method::from_bytes(b"X-RANDOM-4821").unwrap();
        assert_eq!(method_label(&custom), "other");
        let purge = Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(method_label(&purge), "other");
    }
}
