//! Signed cookie session store.
//!
//! # Responsibilities
//! - Serialize session values into a single signed cookie
//! - Verify the signature and age of incoming session cookies
//!
//! # Design Decisions
//! - The payload is JSON, base64url encoded, signed with HMAC through
//!   `axum_extra`'s signed jar (not encrypted: values are readable by the client)
//! - The signing key is the SHA-512 digest of the configured secret
//! - Expiry is enforced server side from the issue timestamp, and the cookie
//!   carries the same lifetime as `Max-Age` so browsers drop it in step

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header::SET_COOKIE, HeaderMap};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha512};
use time::Duration;

use crate::config::SessionConfig;
use crate::session::store::{Session, SessionError, SessionStore};

#[derive(Debug, Serialize, Deserialize)]
struct CookiePayload {
    values: Map<String, Value>,
    iat: u64,
}

/// Session store backed by a signed client-side cookie.
#[derive(Clone)]
pub struct CookieSessionStore {
    name: String,
    key: Key,
    max_age_secs: u64,
    secure: bool,
}

impl std::fmt::Debug for CookieSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSessionStore")
            .field("name", &self.name)
            .field("max_age_secs", &self.max_age_secs)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl CookieSessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let digest = Sha512::digest(config.secret.as_bytes());
        Self {
            name: config.name.clone(),
            key: Key::from(digest.as_slice()),
            max_age_secs: config.max_age_secs,
            secure: config.secure,
        }
    }

    fn load_at(&self, headers: &HeaderMap, now: u64) -> Result<Session, SessionError> {
        if CookieJar::from_headers(headers).get(&self.name).is_none() {
            return Ok(Session::new());
        }

        let cookie = SignedCookieJar::<Key>::from_headers(headers, self.key.clone())
            .get(&self.name)
            .ok_or(SessionError::InvalidSignature)?;

        let raw = URL_SAFE_NO_PAD
            .decode(cookie.value())
            .map_err(|e| SessionError::Decode(e.to_string()))?;
        let payload: CookiePayload =
            serde_json::from_slice(&raw).map_err(|e| SessionError::Decode(e.to_string()))?;

        if now.saturating_sub(payload.iat) > self.max_age_secs {
            return Err(SessionError::Expired);
        }

        Ok(Session::from_values(payload.values))
    }

    fn save_at(
        &self,
        session: &Session,
        headers: &mut HeaderMap,
        now: u64,
    ) -> Result<(), SessionError> {
        let payload = CookiePayload {
            values: session.values().clone(),
            iat: now,
        };
        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);

        let cookie = Cookie::build((self.name.clone(), encoded))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::seconds(
                i64::try_from(self.max_age_secs).unwrap_or(i64::MAX),
            ));

        let signed = SignedCookieJar::<Key>::new(self.key.clone())
            .add(cookie)
            .into_response();
        for value in signed.headers().get_all(SET_COOKIE) {
            headers.append(SET_COOKIE, value.clone());
        }
        Ok(())
    }
}

impl SessionStore for CookieSessionStore {
    fn load(&self, headers: &HeaderMap) -> Result<Session, SessionError> {
        self.load_at(headers, unix_now())
    }

    fn save(&self, session: &Session, headers: &mut HeaderMap) -> Result<(), SessionError> {
        self.save_at(session, headers, unix_now())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
