//! Session abstraction shared by the identity resolver and the token exchange.

use axum::http::HeaderMap;
use serde_json::{Map, Value};

/// Session key holding the verified subject identifier.
pub const USER_ID: &str = "user_id";

/// Session key holding the display name reported by the identity provider.
pub const NAME: &str = "name";

/// Errors raised while loading or persisting a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session cookie signature is invalid")]
    InvalidSignature,

    #[error("session cookie could not be decoded: {0}")]
    Decode(String),

    #[error("session cookie expired")]
    Expired,

    #[error("session could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Per-request bag of session values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    values: Map<String, Value>,
    is_new: bool,
}

impl Session {
    /// An empty session not yet backed by a cookie.
    pub fn new() -> Self {
        Self {
            values: Map::new(),
            is_new: true,
        }
    }

    /// A session restored from a verified cookie.
    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            is_new: false,
        }
    }

    /// Typed accessor: `None` when the key is absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// True when no cookie was presented for this session.
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

/// Keyed session storage scoped to a single request/response pair.
pub trait SessionStore: Send + Sync + 'static {
    /// Load the session carried by the request headers.
    ///
    /// A request without a session cookie yields an empty new session;
    /// a cookie that fails verification is an error.
    fn load(&self, headers: &HeaderMap) -> Result<Session, SessionError>;

    /// Persist the session by writing it onto the response headers.
    fn save(&self, session: &Session, headers: &mut HeaderMap) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_str_collapses_absent_and_wrong_type() {
        let mut session = Session::new();
        session.insert(USER_ID, json!(42));
        session.insert(NAME, "Alice");

        assert_eq!(session.get_str(USER_ID), None);
        assert_eq!(session.get_str("missing"), None);
        assert_eq!(session.get_str(NAME), Some("Alice"));
    }

    #[test]
    fn test_new_and_restored_sessions() {
        assert!(Session::new().is_new());

        let mut values = Map::new();
        values.insert(USER_ID.into(), json!("u1"));
        let restored = Session::from_values(values);
        assert!(!restored.is_new());
        assert_eq!(restored.get_str(USER_ID), Some("u1"));
    }
}
