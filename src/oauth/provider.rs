//! Identity provider client.
//!
//! # Responsibilities
//! - Send a bearer token to the provider's token-info endpoint
//! - Classify failures (unreachable, rejected, unreadable)
//! - Extract the subject and display name from the response
//!
//! # Design Decisions
//! - Exactly one attempt per token, bounded by a timeout
//! - Transport errors drop the request URL, which carries the token
//! - Signature verification is the provider's job, not ours

use std::collections::HashMap;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use crate::config::IdentityConfig;

/// Failure while verifying a token with the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("identity provider unreachable: {0}")]
    Request(#[source] reqwest::Error),

    #[error("identity provider rejected token with status {0}")]
    Rejected(StatusCode),

    #[error("failed to read identity provider response: {0}")]
    Body(#[source] reqwest::Error),

    #[error("identity provider response is not a JSON object: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("identity provider response has no subject")]
    MissingSubject,
}

/// Identity asserted by the provider for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub name: String,
}

/// HTTP client for a token-info style verification endpoint.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    client: reqwest::Client,
    tokeninfo_url: String,
}

impl IdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            tokeninfo_url: config.tokeninfo_url.clone(),
        })
    }

    /// Verify `token`, returning the identity it belongs to.
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ProviderError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Rejected(status));
        }

        let body = response.bytes().await.map_err(|e| ProviderError::Body(e.without_url()))?;
        let claims = decode_claims(&body)?;

        let subject = claims
            .get("sub")
            .filter(|s| !s.is_empty())
            .cloned()
            .ok_or(ProviderError::MissingSubject)?;
        let name = claims.get("name").cloned().unwrap_or_default();

        Ok(VerifiedIdentity { subject, name })
    }
}

/// Decode a JSON object into its string-valued members.
///
/// Members of any other type are dropped.
pub fn decode_claims(body: &[u8]) -> Result<HashMap<String, String>, serde_json::Error> {
    let raw: HashMap<String, Value> = serde_json::from_slice(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_claims_keeps_strings_only() {
        let claims = decode_claims(
            br#"{"sub":"u1","name":"Alice","email_verified":true,"exp":1700000000}"#,
        )
        .unwrap();

        assert_eq!(claims.len(), 2);
        assert_eq!(claims["sub"], "u1");
        assert_eq!(claims["name"], "Alice");
    }

    #[test]
    fn test_decode_claims_rejects_non_objects() {
        assert!(decode_claims(b"not json").is_err());
        assert!(decode_claims(b"[\"sub\"]").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_request_error() {
        let provider = IdentityProvider::new(&IdentityConfig {
            tokeninfo_url: "http://127.0.0.1:9/tokeninfo".into(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = provider.verify("SECRET-BEARER-TOKEN").await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
        assert!(!err.to_string().contains("SECRET-BEARER-TOKEN"), "{}", err);
        assert!(!format!("{:?}", err).contains("SECRET-BEARER-TOKEN"));
    }
}
