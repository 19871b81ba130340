//! Static service registry.
//!
//! # Responsibilities
//! - Map service names to backend origins (scheme + authority)
//! - Reject entries that cannot form an absolute URI at construction time
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - One target per service name, no load balancing

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::uri::{Authority, InvalidUri, Scheme};

use crate::config::ServiceConfig;

/// Error raised while building the registry from configuration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("service '{0}' has an empty host")]
    EmptyHost(String),

    #[error("service '{name}' has invalid scheme '{scheme}'")]
    Scheme { name: String, scheme: String },

    #[error("service '{name}' has invalid authority '{authority}': {source}")]
    Authority {
        name: String,
        authority: String,
        #[source]
        source: InvalidUri,
    },

    #[error("service '{0}' is registered twice")]
    Duplicate(String),
}

/// Origin a service's requests are forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    scheme: Scheme,
    authority: Authority,
}

impl ServiceTarget {
    pub fn new(scheme: Scheme, authority: Authority) -> Self {
        Self { scheme, authority }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl std::fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Immutable mapping from service name to target origin.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceTarget>,
}

impl ServiceRegistry {
    /// Build the registry from configured services.
    pub fn from_config(configs: &[ServiceConfig]) -> Result<Self, RegistryError> {
        let mut services = HashMap::with_capacity(configs.len());

        for config in configs {
            if config.host.trim().is_empty() {
                return Err(RegistryError::EmptyHost(config.name.clone()));
            }

            // Backends are reached over plain HTTP only.
            if config.scheme != "http" {
                return Err(RegistryError::Scheme {
                    name: config.name.clone(),
                    scheme: config.scheme.clone(),
                });
            }
            let scheme = Scheme::HTTP;

            let authority_str = config.authority();
            let authority =
                Authority::from_str(&authority_str).map_err(|source| RegistryError::Authority {
                    name: config.name.clone(),
                    authority: authority_str.clone(),
                    source,
                })?;

            let target = ServiceTarget::new(scheme, authority);
            tracing::debug!(service = %config.name, target = %target, "Registered service");

            if services.insert(config.name.clone(), target).is_some() {
                return Err(RegistryError::Duplicate(config.name.clone()));
            }
        }

        Ok(Self { services })
    }

    /// Look up the target for a service name.
    pub fn get(&self, name: &str) -> Option<&ServiceTarget> {
        self.services.get(name)
    }

    /// Registered service names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
