//! Token-exchange endpoint.
//!
//! # Responsibilities
//! - Load the caller's session before anything else
//! - Verify the supplied token with the identity provider
//! - Store the verified subject and name in the session cookie
//!
//! # Design Decisions
//! - The only writer of session identity values
//! - Every failure is terminal for the request; the client retries if it wants to
//! - The token is read from the form body first, then the query string

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::oauth::provider::{IdentityProvider, ProviderError};
use crate::observability::metrics;
use crate::session::{SessionError, SessionStore, NAME, USER_ID};

/// Parameters accepted by the callback.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    #[serde(default)]
    pub token: String,
}

/// Why a token exchange did not establish a session.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("session unavailable: {0}")]
    Session(#[from] SessionError),

    #[error("no token supplied")]
    MissingToken,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ExchangeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExchangeError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ExchangeError::MissingToken => StatusCode::NOT_FOUND,
            ExchangeError::Provider(ProviderError::Body(_) | ProviderError::Decode(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ExchangeError::Provider(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            ExchangeError::MissingToken => "missing_token",
            ExchangeError::Provider(ProviderError::Rejected(_) | ProviderError::MissingSubject) => {
                "rejected"
            }
            _ => "error",
        }
    }
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Session-establishing half of the gateway.
pub struct TokenExchange {
    store: Arc<dyn SessionStore>,
    provider: IdentityProvider,
}

impl TokenExchange {
    pub fn new(store: Arc<dyn SessionStore>, provider: IdentityProvider) -> Self {
        Self { store, provider }
    }

    /// Run the exchange, returning the headers that persist the session.
    pub async fn exchange(
        &self,
        request_headers: &HeaderMap,
        token: &str,
    ) -> Result<HeaderMap, ExchangeError> {
        let mut session = self.store.load(request_headers)?;

        if token.is_empty() {
            return Err(ExchangeError::MissingToken);
        }
        tracing::debug!("Received token");

        let identity = self.provider.verify(token).await?;

        session.insert(USER_ID, identity.subject.clone());
        session.insert(NAME, identity.name);

        let mut response_headers = HeaderMap::new();
        self.store.save(&session, &mut response_headers)?;

        tracing::info!(
            user_id = %identity.subject,
            replaced = !session.is_new(),
            "Session established"
        );
        Ok(response_headers)
    }
}

/// `GET|POST /oauth/?token=...`
pub async fn oauth_callback(
    State(exchange): State<Arc<TokenExchange>>,
    headers: HeaderMap,
    query: Result<Query<TokenParams>, QueryRejection>,
    form: Result<Form<TokenParams>, FormRejection>,
) -> Response {
    let from_form = form.map(|Form(p)| p.token).unwrap_or_default();
    let token = if from_form.is_empty() {
        query.map(|Query(p)| p.token).unwrap_or_default()
    } else {
        from_form
    };

    match exchange.exchange(&headers, &token).await {
        Ok(cookies) => {
            metrics::record_token_exchange("success");
            (StatusCode::OK, cookies).into_response()
        }
        Err(e) => {
            metrics::record_token_exchange(e.outcome());
            if matches!(e, ExchangeError::MissingToken) {
                tracing::debug!("Token exchange without token");
            } else {
                tracing::warn!(error = %e, "Token exchange failed");
            }
            e.into_response()
        }
    }
}
