//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the service registry, session store and identity resolver
//! - Create the Axum Router with all handlers (proxy, token exchange, static)
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a listener until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::proxy::{strip_proxy_prefix, ReverseProxy};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::transport::{AuthorizingTransport, HyperTransport};
use crate::oauth::{self, IdentityProvider, TokenExchange};
use crate::routing::{RegistryError, ServiceRegistry, ServiceRouter};
use crate::security::IdentityResolver;
use crate::session::{CookieSessionStore, SessionStore};

/// The fully composed proxy served under `/prx`.
pub type GatewayProxy = ReverseProxy<AuthorizingTransport<HyperTransport, IdentityResolver>>;

/// Error building the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid service registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to build identity provider client: {0}")]
    IdentityClient(#[from] reqwest::Error),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let registry = ServiceRegistry::from_config(&config.services)?;
        tracing::info!(services = ?registry.names(), "Service registry built");

        let store: Arc<dyn SessionStore> = Arc::new(CookieSessionStore::new(&config.session));

        let resolver = if config.access.public {
            tracing::warn!("Public mode: every proxied request is authorized with an empty identity");
            IdentityResolver::public()
        } else {
            IdentityResolver::with_store(store.clone())
        };

        let transport = AuthorizingTransport::new(
            HyperTransport::new(Duration::from_secs(config.timeouts.connect_secs)),
            resolver,
        );
        let proxy = Arc::new(ReverseProxy::new(ServiceRouter::new(registry), transport));

        let provider = IdentityProvider::new(&config.identity)?;
        let exchange = Arc::new(TokenExchange::new(store, provider));

        let router = Self::build_router(&config, proxy, exchange);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        proxy: Arc<GatewayProxy>,
        exchange: Arc<TokenExchange>,
    ) -> Router {
        let proxy_routes = Router::new()
            .route("/prx", any(proxy_handler))
            .route("/prx/", any(proxy_handler))
            .route("/prx/{*rest}", any(proxy_handler))
            .with_state(proxy);

        tracing::info!("Handling proxying to services on /prx/");
        tracing::info!(dir = %config.web.static_dir, "Handling web GUI on /");

        Router::new()
            .merge(proxy_routes)
            .merge(oauth::routes(exchange))
            .fallback_service(ServeDir::new(&config.web.static_dir))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The composed handler, for serving elsewhere or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            public = self.config.access.public,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Proxy handler: strips `/prx` and hands the request to the reverse proxy.
async fn proxy_handler(State(proxy): State<Arc<GatewayProxy>>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();
    let Some(uri) = strip_proxy_prefix(&parts.uri) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    parts.uri = uri;

    proxy.forward(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use tower::ServiceExt;

    fn server(public: bool) -> HttpServer {
        let mut config = GatewayConfig::default();
        config.access.public = public;
        config.services = vec![ServiceConfig::http("course", "127.0.0.1", Some(9))];
        config.web.static_dir = std::env::temp_dir().to_string_lossy().into_owned();
        HttpServer::new(config).unwrap()
    }

    async fn status_of(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_unauthorized_proxy_request() {
        let router = server(false).router();
        assert_eq!(status_of(router, "/prx/course/42").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_oauth_without_token_is_not_found() {
        let router = server(false).router();
        assert_eq!(status_of(router.clone(), "/oauth/").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of(router, "/oauth/?token=").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_public_unknown_service_is_bad_gateway() {
        let router = server(true).router();
        assert_eq!(status_of(router, "/prx/grades/1").await, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_static_fallback_for_missing_file() {
        let router = server(false).router();
        assert_eq!(
            status_of(router, "/definitely-not-a-real-asset.js").await,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_rejects_empty_service_host() {
        let mut config = GatewayConfig::default();
        config.services = vec![ServiceConfig::http("course", "", None)];
        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::Registry(RegistryError::EmptyHost(_)))
        ));
    }
}
