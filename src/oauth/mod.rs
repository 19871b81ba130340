//! Token exchange subsystem.
//!
//! # Data Flow
//! ```text
//! /oauth/?token=...
//!     → callback.rs (load session, read token)
//!     → provider.rs (verify with identity provider)
//!     → callback.rs (write user_id/name, save session cookie)
//! ```

pub mod callback;
pub mod provider;

use std::sync::Arc;

use axum::{routing::get, Router};

pub use callback::{oauth_callback, ExchangeError, TokenExchange};
pub use provider::{IdentityProvider, ProviderError, VerifiedIdentity};

/// Routes serving the token-exchange callback.
pub fn routes(exchange: Arc<TokenExchange>) -> Router {
    Router::new()
        .route("/oauth", get(oauth_callback).post(oauth_callback))
        .route("/oauth/", get(oauth_callback).post(oauth_callback))
        .route("/oauth/{*rest}", get(oauth_callback).post(oauth_callback))
        .with_state(exchange)
}
