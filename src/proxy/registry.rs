//! Service proxy registry.
//!
//! Owns one [`ServiceProxy`] per configured service, keyed by service name.
//! All proxies share a single pooled HTTP client; connections to a backend
//! are reused across services and requests.
//!
//! Construction is all-or-nothing: one invalid target URL fails the whole
//! registry, so dispatch never observes a partially usable service set.

use std::collections::HashMap;

use axum::body::Body;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::proxy::service::ServiceProxy;

/// A service whose proxy could not be constructed.
#[derive(Debug, Error)]
#[error("service '{service}': {detail}")]
pub struct RegistryError {
    pub service: String,
    pub detail: String,
}

/// Lookup table of per-service forwarding proxies.
#[derive(Debug)]
pub struct ProxyRegistry {
    client: Client<HttpConnector, Body>,
    proxies: HashMap<String, ServiceProxy>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
            proxies: HashMap::new(),
        }
    }

    /// Register a proxy for one service, validating its target URL.
    pub fn add_service(&mut self, service: &ServiceConfig) -> Result<(), RegistryError> {
        let proxy = ServiceProxy::new(service, self.client.clone())?;
        self.proxies.insert(service.name.clone(), proxy);
        Ok(())
    }

    /// Build a registry covering every given service.
    pub fn build(services: &[ServiceConfig]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for service in services {
            registry.add_service(service)?;
        }
        Ok(registry)
    }

    /// Look up the proxy for a service by name.
    pub fn get(&self, name: &str) -> Option<&ServiceProxy> {
        self.proxies.get(name)
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl Default for ProxyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, target_url: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            base_path: format!("/{name}"),
            target_url: target_url.to_string(),
            routes: vec![],
        }
    }

    #[test]
    fn builds_a_proxy_per_service() {
        let registry = ProxyRegistry::build(&[
            service("users", "http://127.0.0.1:3001"),
            service("orders", "http://127.0.0.1:3002"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("users").is_some());
        assert!(registry.get("orders").is_some());
        assert!(registry.get("payments").is_none());
    }

    #[test]
    fn one_bad_target_fails_the_whole_registry() {
        let err = ProxyRegistry::build(&[
            service("users", "http://127.0.0.1:3001"),
            service("orders", "not a url"),
        ])
        .unwrap_err();
        assert_eq!(err.service, "orders");
    }

    #[test]
    fn empty_registry_is_empty() {
        let registry = ProxyRegistry::build(&[]).unwrap();
        assert!(registry.is_empty());
    }
}
