//! Request director.
//!
//! # Responsibilities
//! - Read the service name from the first path segment
//! - Rewrite scheme, authority and path to the registered target
//! - Leave unresolvable requests untouched and report why
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) service lookup via HashMap
//! - A request is rewritten at most once; the resolved service is recorded
//!   as a request extension and later calls are no-ops

use std::sync::Arc;

use axum::http::{Request, Uri};

use crate::routing::registry::ServiceRegistry;

/// Why a request could not be directed to a backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("no service segment in path '{0}'")]
    MissingService(String),

    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("rewritten uri for service '{0}' is invalid")]
    InvalidUri(String),
}

/// Marker extension for a request already rewritten to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService(pub String);

/// Rewrites requests of the form `/{service}/{rest}` to `{target}/{rest}`.
#[derive(Debug, Clone)]
pub struct ServiceRouter {
    registry: Arc<ServiceRegistry>,
}

impl ServiceRouter {
    pub fn new(registry: ServiceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Rewrite the request target in place.
    ///
    /// On error the request is left unmodified; the transport will then fail
    /// to reach a backend because the URI has no scheme or authority.
    pub fn direct<B>(&self, req: &mut Request<B>) -> Result<(), RoutingError> {
        if req.extensions().get::<ResolvedService>().is_some() {
            return Ok(());
        }

        let path = req.uri().path().to_string();
        tracing::debug!(path = %path, "Directing request");

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 {
            tracing::warn!(path = %path, "Failed to match service path");
            return Err(RoutingError::MissingService(path));
        }

        let service = segments[1];
        let Some(target) = self.registry.get(service) else {
            tracing::warn!(service = %service, "Failed to look up service");
            return Err(RoutingError::UnknownService(service.to_string()));
        };

        let new_path = format!("/{}", segments[2..].join("/"));
        let path_and_query = match req.uri().query() {
            Some(query) => format!("{}?{}", new_path, query),
            None => new_path,
        };

        let uri = Uri::builder()
            .scheme(target.scheme().clone())
            .authority(target.authority().clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|_| RoutingError::InvalidUri(service.to_string()))?;

        tracing::debug!(service = %service, uri = %uri, "Directing to service");

        *req.uri_mut() = uri;
        req.extensions_mut()
            .insert(ResolvedService(service.to_string()));
        Ok(())
    }
}
