//! Reverse proxy composition.
//!
//! # Data Flow
//! ```text
//! /prx/{service}/{rest}
//!     → strip_proxy_prefix  (/{service}/{rest})
//!     → ServiceRouter::direct (http://{target}/{rest})
//!     → header hygiene (hop-by-hop, X-Forwarded-For)
//!     → Transport::round_trip (authorization gate, then backend)
//!     → response (hop-by-hop stripped) or 502
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, StatusCode, Uri, Version},
    response::IntoResponse,
};

use crate::http::request::request_id;
use crate::http::transport::Transport;
use crate::observability::metrics;
use crate::routing::{ResolvedService, ServiceRouter};
use crate::security::headers::{append_forwarded_for, strip_hop_by_hop};

/// Path prefix under which services are exposed.
pub const PROXY_PREFIX: &str = "/prx";

/// Director + transport, usable as a single request handler.
#[derive(Debug)]
pub struct ReverseProxy<T> {
    router: ServiceRouter,
    transport: T,
}

impl<T: Transport> ReverseProxy<T> {
    pub fn new(router: ServiceRouter, transport: T) -> Self {
        Self { router, transport }
    }

    /// Forward a request whose path starts at the service segment.
    pub async fn forward(&self, mut req: Request<Body>) -> Response<Body> {
        let start_time = Instant::now();
        let request_id = request_id(req.headers()).to_string();
        let method = metrics::method_label(req.method());

        // Unresolved requests continue and fail at the transport.
        let _ = self.router.direct(&mut req);
        let service = req
            .extensions()
            .get::<ResolvedService>()
            .map(|s| s.0.clone())
            .unwrap_or_else(|| "unresolved".to_string());

        let client_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        strip_hop_by_hop(req.headers_mut());
        if let Some(ip) = client_ip {
            append_forwarded_for(req.headers_mut(), ip);
        }
        *req.version_mut() = Version::HTTP_11;

        match self.transport.round_trip(req).await {
            Ok(mut response) => {
                strip_hop_by_hop(response.headers_mut());
                metrics::record_proxy_request(method, &service, response.status().as_u16(), start_time);
                response
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    service = %service,
                    error = %e,
                    "Upstream error"
                );
                metrics::record_proxy_request(method, &service, 502, start_time);
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }
}

/// Remove [`PROXY_PREFIX`] from a request URI, keeping the query.
///
/// Returns `None` when the path is not under the prefix.
pub fn strip_proxy_prefix(uri: &Uri) -> Option<Uri> {
    let rest = uri.path().strip_prefix(PROXY_PREFIX)?;
    let path = match rest {
        "" => "/",
        rest if rest.starts_with('/') => rest,
        _ => return None,
    };

    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    Uri::builder().path_and_query(path_and_query).build().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::http::transport::TransportError;
    use crate::routing::ServiceRegistry;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingTransport {
        seen: Arc<Mutex<Vec<Request<()>>>>,
    }

    impl Transport for RecordingTransport {
        async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, TransportError> {
            if req.uri().authority().is_none() {
                return Err(TransportError::Unrouted(req.uri().to_string()));
            }
            let (parts, _) = req.into_parts();
            self.seen.lock().unwrap().push(Request::from_parts(parts, ()));

            let mut response = Response::new(Body::from("ok"));
            response
                .headers_mut()
                .insert("connection", "close".parse().unwrap());
            Ok(response)
        }
    }

    fn proxy(transport: RecordingTransport) -> ReverseProxy<RecordingTransport> {
        let registry =
            ServiceRegistry::from_config(&[ServiceConfig::http("course", "coursestore", Some(5000))])
                .unwrap();
        ReverseProxy::new(ServiceRouter::new(registry), transport)
    }

    #[test]
    fn test_strip_proxy_prefix() {
        let strip = |s: &str| strip_proxy_prefix(&s.parse().unwrap()).map(|u| u.to_string());

        assert_eq!(strip("/prx/course/42?x=1"), Some("/course/42?x=1".into()));
        assert_eq!(strip("/prx/"), Some("/".into()));
        assert_eq!(strip("/prx"), Some("/".into()));
        assert_eq!(strip("/prxy/course"), None);
        assert_eq!(strip("/oauth/"), None);
    }

    #[tokio::test]
    async fn test_forward_rewrites_and_cleans_headers() {
        let transport = RecordingTransport::default();
        let proxy = proxy(transport.clone());

        let mut req = Request::builder()
            .uri("/course/42")
            .version(Version::HTTP_2)
            .header("connection", "keep-alive")
            .header("keep-alive", "timeout=5")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.1.2.3:5555".parse::<SocketAddr>().unwrap()));

        let response = proxy.forward(req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("connection").is_none());

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].uri().to_string(), "http://coursestore:5000/42");
        assert_eq!(seen[0].version(), Version::HTTP_11);
        assert_eq!(seen[0].headers()["x-forwarded-for"], "10.1.2.3");
        assert!(seen[0].headers().get("keep-alive").is_none());
    }

    #[tokio::test]
    async fn test_unknown_service_becomes_bad_gateway() {
        let transport = RecordingTransport::default();
        let proxy = proxy(transport.clone());

        let req = Request::builder().uri("/grades/1").body(Body::empty()).unwrap();
        let response = proxy.forward(req).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(transport.seen.lock().unwrap().is_empty());
    }
}
