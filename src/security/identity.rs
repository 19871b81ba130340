//! Identity resolution for proxied requests.
//!
//! # Responsibilities
//! - Decide whether a request may reach a backend
//! - Stamp the resolved identity onto the `user_id` request header
//!
//! # Design Decisions
//! - Fail closed: any session store error denies the request
//! - Public mode never touches the session store and always sends an empty identity
//! - The header is always overwritten on success, so a client-supplied
//!   `user_id` header never reaches a backend

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Request};

use crate::session::{SessionStore, USER_ID};

/// Header carrying the resolved identity to backends.
pub const IDENTITY_HEADER: HeaderName = HeaderName::from_static("user_id");

/// Per-request authorization predicate.
///
/// Implementations may mutate the request (e.g. add headers); the mutation
/// is what gets forwarded when the request is authorized.
pub trait Authorizer: Send + Sync + 'static {
    fn authorize<B>(&self, req: &mut Request<B>) -> bool;
}

/// How identities are resolved for the whole deployment.
#[derive(Clone)]
pub enum AccessMode {
    /// Every request is authorized with an empty identity.
    Public,
    /// Identity comes from the request's session.
    Session(Arc<dyn SessionStore>),
}

impl std::fmt::Debug for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessMode::Public => f.write_str("Public"),
            AccessMode::Session(_) => f.write_str("Session"),
        }
    }
}

/// Resolves the identity of a request from its session.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    mode: AccessMode,
}

impl IdentityResolver {
    pub fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    pub fn public() -> Self {
        Self::new(AccessMode::Public)
    }

    pub fn with_store(store: Arc<dyn SessionStore>) -> Self {
        Self::new(AccessMode::Session(store))
    }
}

impl Authorizer for IdentityResolver {
    fn authorize<B>(&self, req: &mut Request<B>) -> bool {
        let store = match &self.mode {
            AccessMode::Public => {
                req.headers_mut()
                    .insert(IDENTITY_HEADER, HeaderValue::from_static(""));
                return true;
            }
            AccessMode::Session(store) => store,
        };

        let session = match store.load(req.headers()) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "Session rejected");
                return false;
            }
        };

        let Some(user_id) = session.get_str(USER_ID).filter(|id| !id.is_empty()) else {
            tracing::debug!("No identity in session");
            return false;
        };

        match HeaderValue::from_str(user_id) {
            Ok(value) => {
                req.headers_mut().insert(IDENTITY_HEADER, value);
                true
            }
            Err(_) => {
                tracing::warn!("Session identity is not a valid header value");
                false
            }
        }
    }
}
