//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::Query,
    http::{header::SET_COOKIE, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use backend_controller::config::{GatewayConfig, ServiceConfig};
use backend_controller::{HttpServer, Shutdown};
use serde_json::json;
use tokio::net::TcpListener;

/// What a mock backend observed about one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
}

/// A backend that answers every request with a fixed body and records it.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last(&self) -> SeenRequest {
        self.seen.lock().unwrap().last().cloned().expect("backend saw no request")
    }
}

/// Start a mock backend on an ephemeral port.
pub async fn start_mock_backend(response: &'static str) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let recorder = seen.clone();
    let app = Router::new().fallback(move |req: Request<Body>| {
        let recorder = recorder.clone();
        async move {
            let header = |name: &str| {
                req.headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            recorder.lock().unwrap().push(SeenRequest {
                method: req.method().to_string(),
                path: req.uri().path().to_string(),
                query: req.uri().query().map(str::to_string),
                user_id: header("user_id"),
                request_id: header("x-request-id"),
            });
            response
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, seen }
}

/// Start a token-info endpoint understanding a few fixed tokens:
/// `VALID` (u1/Alice), `BOB` (u2/Bob), `NOSUB`, `GARBAGE`; anything else is rejected.
pub async fn start_mock_provider() -> SocketAddr {
    async fn tokeninfo(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
        match params.get("id_token").map(String::as_str) {
            Some("VALID") => Json(json!({
                "sub": "u1",
                "name": "Alice",
                "email_verified": "true",
                "exp": 1_900_000_000
            }))
            .into_response(),
            Some("BOB") => Json(json!({"sub": "u2", "name": "Bob"})).into_response(),
            Some("NOSUB") => Json(json!({"name": "Nobody"})).into_response(),
            Some("GARBAGE") => (StatusCode::OK, "<html>oops</html>").into_response(),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "invalid_token"})),
            )
                .into_response(),
        }
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/tokeninfo", get(tokeninfo));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Gateway configuration pointing `course` at `course` and the token
/// exchange at the mock provider.
pub fn gateway_config(course: SocketAddr, provider: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.services = vec![
        ServiceConfig::http("course", course.ip().to_string(), Some(course.port())),
        // Nothing listens on the discard port.
        ServiceConfig::http("schedule", "127.0.0.1", Some(9)),
    ];
    config.identity.tokeninfo_url = format!("http://{}/tokeninfo", provider);
    config.identity.timeout_secs = 2;
    config.web.static_dir = std::env::temp_dir().to_string_lossy().into_owned();
    config
}

/// A running gateway; shut down on drop.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Build and serve a gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> Gateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// The `name=value` pair of the response's session cookie, if one was set.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
