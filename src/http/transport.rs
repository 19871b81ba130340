//! Outbound transports.
//!
//! # Responsibilities
//! - Define the single "send request, get response" capability
//! - Provide the hyper-backed passthrough implementation
//! - Gate a transport behind an authorization predicate
//!
//! # Design Decisions
//! - Composition by construction: `AuthorizingTransport<HyperTransport, _>`
//! - No retries at any layer; errors are returned verbatim
//! - Denied requests never reach the inner transport

use std::future::Future;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::observability::metrics;
use crate::security::Authorizer;

/// Error returned by a transport round trip.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request has no backend target: {0}")]
    Unrouted(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Sends a request to a backend and returns its response.
pub trait Transport: Send + Sync + 'static {
    fn round_trip(
        &self,
        req: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, TransportError>> + Send;
}

/// Plain HTTP/1.1 transport over a pooled hyper client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
}

impl HyperTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }
}

impl Transport for HyperTransport {
    async fn round_trip(&self, req: Request<Body>) -> Result<Response<Body>, TransportError> {
        if req.uri().scheme().is_none() || req.uri().authority().is_none() {
            return Err(TransportError::Unrouted(req.uri().to_string()));
        }

        let response = self.client.request(req).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Transport that only forwards requests its authorizer accepts.
#[derive(Debug, Clone)]
pub struct AuthorizingTransport<T, A> {
    inner: T,
    authorizer: A,
}

impl<T, A> AuthorizingTransport<T, A> {
    pub fn new(inner: T, authorizer: A) -> Self {
        Self { inner, authorizer }
    }
}

impl<T: Transport, A: Authorizer> Transport for AuthorizingTransport<T, A> {
    async fn round_trip(&self, mut req: Request<Body>) -> Result<Response<Body>, TransportError> {
        if self.authorizer.authorize(&mut req) {
            tracing::debug!(uri = %req.uri(), "Letting round trip");
            metrics::record_authorization(true);
            self.inner.round_trip(req).await
        } else {
            tracing::debug!(uri = %req.uri(), "Returning unauthorized");
            metrics::record_authorization(false);
            Ok(unauthorized_response())
        }
    }
}

/// Synthetic 401 with no headers and an empty body.
pub fn unauthorized_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}
