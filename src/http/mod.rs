//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID)
//!     → /prx/*   → proxy.rs (director, header hygiene)
//!                → transport.rs (authorization gate → backend)
//!     → /oauth/* → token exchange (crate::oauth)
//!     → other    → static files
//! ```

pub mod proxy;
pub mod request;
pub mod server;
pub mod transport;

pub use proxy::{ReverseProxy, PROXY_PREFIX};
pub use request::X_REQUEST_ID;
pub use server::{GatewayProxy, HttpServer, ServerError};
pub use transport::{AuthorizingTransport, HyperTransport, Transport, TransportError};
