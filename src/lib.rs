//! Authenticated reverse-proxy gateway.
//!
//! Routes `/prx/{service}/...` to named backends once the caller's session
//! carries a verified identity, establishes that identity through the
//! `/oauth/` token exchange, and serves a static web UI for everything else.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod oauth;
pub mod observability;
pub mod routing;
pub mod security;
pub mod session;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
