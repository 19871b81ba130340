//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every service resolves to a usable origin
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("session cookie name is not a valid cookie token: '{0}'")]
    SessionName(String),

    #[error("session secret must not be empty")]
    EmptySecret,

    #[error("invalid identity provider url '{0}'")]
    IdentityUrl(String),

    #[error("service name '{0}' must be a non-empty path segment")]
    ServiceName(String),

    #[error("service '{0}' is defined more than once")]
    DuplicateService(String),

    #[error("service '{0}' has an empty host")]
    EmptyHost(String),

    #[error("service '{name}' uses unsupported scheme '{scheme}'")]
    Scheme { name: String, scheme: String },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }
    if config.identity.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("identity.timeout_secs"));
    }
    if config.session.max_age_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("session.max_age_secs"));
    }

    if !is_cookie_token(&config.session.name) {
        errors.push(ValidationError::SessionName(config.session.name.clone()));
    }
    if config.session.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }

    match url::Url::parse(&config.identity.tokeninfo_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::IdentityUrl(config.identity.tokeninfo_url.clone())),
    }

    let mut seen = HashSet::new();
    for service in &config.services {
        if service.name.is_empty() || service.name.contains('/') {
            errors.push(ValidationError::ServiceName(service.name.clone()));
        } else if !seen.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }

        if service.host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost(service.name.clone()));
        }

        if service.scheme != "http" {
            errors.push(ValidationError::Scheme {
                name: service.name.clone(),
                scheme: service.scheme.clone(),
            });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 6265 cookie-name token check.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServiceConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.session.secret.clear();
        config.services.push(ServiceConfig::http("course", "elsewhere", None));
        config.services.push(ServiceConfig::http("empty", "  ", Some(80)));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::EmptySecret));
        assert!(errors.contains(&ValidationError::DuplicateService("course".into())));
        assert!(errors.contains(&ValidationError::EmptyHost("empty".into())));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_rejects_bad_service_names_and_schemes() {
        let mut config = GatewayConfig::default();
        config.services = vec![
            ServiceConfig::http("", "a", None),
            ServiceConfig::http("a/b", "b", None),
            ServiceConfig {
                name: "ftp".into(),
                scheme: "ftp".into(),
                host: "c".into(),
                port: None,
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[2], ValidationError::Scheme { .. }));
    }

    #[test]
    fn test_rejects_zero_session_lifetime() {
        let mut config = GatewayConfig::default();
        config.session.max_age_secs = 0;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ZeroTimeout("session.max_age_secs")])
        );
    }

    #[test]
    fn test_rejects_bad_cookie_name() {
        let mut config = GatewayConfig::default();
        config.session.name = "my session".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::SessionName("my session".into())])
        );
    }
}
