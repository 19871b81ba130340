//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Identity provider used by the token exchange.
    pub identity: IdentityConfig,

    /// Access mode (public or per-user sessions).
    pub access: AccessConfig,

    /// Static web UI settings.
    pub web: WebConfig,

    /// Backend services reachable under `/prx/{name}/`.
    pub services: Vec<ServiceConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            session: SessionConfig::default(),
            identity: IdentityConfig::default(),
            access: AccessConfig::default(),
            web: WebConfig::default(),
            services: vec![
                ServiceConfig::http("course", "coursestore", None),
                ServiceConfig::http("schedule", "schedulestore", None),
            ],
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Look up a service entry by name for in-place modification.
    pub fn service_mut(&mut self, name: &str) -> Option<&mut ServiceConfig> {
        self.services.iter_mut().find(|s| s.name == name)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie name.
    pub name: String,

    /// Secret the cookie signing key is derived from.
    pub secret: String,

    /// Lifetime of a session cookie in seconds.
    pub max_age_secs: u64,

    /// Mark the cookie `Secure` (HTTPS only).
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "sessionname".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            secret: "sessionsecret".to_string(),
            max_age_secs: 30 * 24 * 60 * 60,
            secure: false,
        }
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Token verification endpoint; the token is sent as `id_token`.
    pub tokeninfo_url: String,

    /// Timeout for the verification call in seconds.
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            tokeninfo_url: "https://www.googleapis.com/oauth2/v3/tokeninfo".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Access mode configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Authorize every proxied request with an empty identity.
    pub public: bool,
}

/// Static web UI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    /// Directory served for paths outside `/prx/` and `/oauth/`.
    pub static_dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            static_dir: "./public".to_string(),
        }
    }
}

/// A named backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Path segment the service is addressed by.
    pub name: String,

    /// URL scheme used to reach the backend; only `http` is supported.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Backend hostname.
    pub host: String,

    /// Backend port; the scheme default when absent.
    #[serde(default)]
    pub port: Option<u16>,
}

impl ServiceConfig {
    /// Plain HTTP service entry.
    pub fn http(name: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            name: name.into(),
            scheme: default_scheme(),
            host: host.into(),
            port,
        }
    }

    /// The `host[:port]` authority of this service.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_register_course_and_schedule() {
        let config = GatewayConfig::default();
        let names: Vec<_> = config.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["course", "schedule"]);
        assert!(!config.access.public);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [session]
            secret = "s3cret"

            [[services]]
            name = "course"
            host = "localhost"
            port = 9001
            "#,
        )
        .unwrap();

        assert_eq!(config.session.secret, "s3cret");
        assert_eq!(config.session.name, "sessionname");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.services.len(), 1);
        assert_eq!(config.services[0].scheme, "http");
        assert_eq!(config.services[0].authority(), "localhost:9001");
    }
}
