//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check uniqueness rules (service names, base paths, route paths)
//! - Validate value ranges (timeouts > 0, ports valid) and target URLs
//! - Reject reserved base paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first, so an operator
//!   sees every problem in one pass
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system; the routing table
//!   re-checks the structural rules when it is built, so a generation can
//!   never be constructed from an invalid config even if a caller skips
//!   this step
//! - Errors carry `service[i]` / `route[j]` positions to make the
//!   offending entry easy to find

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::method::{MethodError, MethodToken};
use crate::routing::path::{compile_path, PathError};

/// Base paths the gateway keeps for itself.
pub const RESERVED_BASE_PATHS: &[&str] = &["/health"];

/// A single validation failure, positioned within the config.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server: host cannot be empty")]
    EmptyHost,

    #[error("server: port cannot be 0")]
    ZeroPort,

    #[error("observability: invalid metrics address '{address}'")]
    BadMetricsAddress { address: String },

    #[error("at least one service must be configured")]
    NoServices,

    #[error("service[{service}]: name cannot be empty")]
    EmptyName { service: usize },

    #[error("service[{service}]: duplicate service name '{name}'")]
    DuplicateName { service: usize, name: String },

    #[error("service[{service}]: duplicate base path '{path}'")]
    DuplicateBasePath { service: usize, path: String },

    #[error("service[{service}]: base path '{path}' is reserved for gateway use")]
    ReservedBasePath { service: usize, path: String },

    #[error("service[{service}]: {detail}")]
    Target { service: usize, detail: String },

    #[error("service[{service}]: at least one route must be configured")]
    NoRoutes { service: usize },

    #[error("service[{service}].route[{route}]: duplicate route path '{path}'")]
    DuplicateRoutePath {
        service: usize,
        route: usize,
        path: String,
    },

    #[error("service[{service}].route[{route}]: at least one HTTP method must be specified")]
    NoMethods { service: usize, route: usize },

    #[error("service[{service}].route[{route}]: {source}")]
    Method {
        service: usize,
        route: usize,
        source: MethodError,
    },

    #[error("service[{service}].route[{route}]: {source}")]
    Path {
        service: usize,
        route: usize,
        source: PathError,
    },

    #[error("service[{service}].route[{route}]: timeout must be greater than 0")]
    ZeroTimeout { service: usize, route: usize },
}

/// Parse and police a backend target URL.
///
/// The forwarding client speaks plain HTTP, so only `http` targets are
/// accepted. Returns a human-readable description of the first problem.
pub(crate) fn parse_target_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid target URL '{raw}': {e}"))?;
    if url.scheme() != "http" {
        return Err(format!(
            "unsupported target scheme '{}' in '{raw}' (only http backends are supported)",
            url.scheme()
        ));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(format!("target URL '{raw}' has no host")),
    }
}

/// Validate the whole config, returning every violation found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress {
            address: config.observability.metrics_address.clone(),
        });
    }

    if config.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }

    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut seen_base_paths: HashSet<&str> = HashSet::new();
    for (si, service) in config.services.iter().enumerate() {
        if service.name.is_empty() {
            errors.push(ValidationError::EmptyName { service: si });
        } else if !seen_names.insert(&service.name) {
            errors.push(ValidationError::DuplicateName {
                service: si,
                name: service.name.clone(),
            });
        }

        let base_ok = service.base_path.starts_with('/');
        if !base_ok {
            errors.push(ValidationError::Path {
                service: si,
                route: 0,
                source: PathError::NotAbsolute {
                    path: service.base_path.clone(),
                },
            });
        } else {
            if RESERVED_BASE_PATHS.contains(&service.base_path.as_str()) {
                errors.push(ValidationError::ReservedBasePath {
                    service: si,
                    path: service.base_path.clone(),
                });
            }
            if !seen_base_paths.insert(&service.base_path) {
                errors.push(ValidationError::DuplicateBasePath {
                    service: si,
                    path: service.base_path.clone(),
                });
            }
        }

        if let Err(detail) = parse_target_url(&service.target_url) {
            errors.push(ValidationError::Target {
                service: si,
                detail,
            });
        }

        if service.routes.is_empty() {
            errors.push(ValidationError::NoRoutes { service: si });
        }

        let mut seen_route_paths: HashSet<&str> = HashSet::new();
        for (ri, route) in service.routes.iter().enumerate() {
            if !seen_route_paths.insert(&route.path) {
                errors.push(ValidationError::DuplicateRoutePath {
                    service: si,
                    route: ri,
                    path: route.path.clone(),
                });
            }

            if route.methods.is_empty() {
                errors.push(ValidationError::NoMethods {
                    service: si,
                    route: ri,
                });
            }
            for token in &route.methods {
                if let Err(source) = token.parse::<MethodToken>() {
                    errors.push(ValidationError::Method {
                        service: si,
                        route: ri,
                        source,
                    });
                }
            }

            if base_ok {
                if let Err(source) = compile_path(&service.base_path, &route.path) {
                    errors.push(ValidationError::Path {
                        service: si,
                        route: ri,
                        source,
                    });
                }
            }

            if route.timeout == Some(0) {
                errors.push(ValidationError::ZeroTimeout {
                    service: si,
                    route: ri,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
