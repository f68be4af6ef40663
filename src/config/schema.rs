//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind host and port).
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Upstream service definitions.
    pub services: Vec<ServiceConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    /// Bind address in `host:port` form, as accepted by `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// A single upstream service and the routes it exposes through the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Unique service identifier for logging/metrics and registry lookups.
    pub name: String,

    /// Path prefix all of this service's routes are mounted under.
    /// Must start with '/' and be unique across services.
    pub base_path: String,

    /// Absolute URL of the backend (e.g., "http://127.0.0.1:3000").
    pub target_url: String,

    /// Routes exposed under `base_path`.
    pub routes: Vec<RouteConfig>,
}

/// A route within a service, relative to the service base path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route path relative to the service base path. Supports `{name}`
    /// parameter segments and a final `*` catch-all segment.
    pub path: String,

    /// HTTP methods accepted by this route. Single verbs ("GET") and
    /// group aliases ("CRUD", "RO", "RW", "FULL") are both accepted.
    pub methods: Vec<String>,

    /// Strip the service base path from the URL before forwarding.
    #[serde(default)]
    pub strip_path: bool,

    /// Per-request deadline in seconds. Unset means no deadline.
    pub timeout: Option<u64>,
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
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
