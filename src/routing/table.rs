//! Compiled routing table: lookup structure for request dispatch.
//!
//! # Responsibilities
//! - Compile validated service configs into per-method match trees
//! - Look up the binding for a (method, path) pair
//! - Reject structurally invalid or ambiguous route sets at build time
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - One match tree per HTTP method; a path registered only for GET is a
//!   no-match for POST, not a method error
//! - Bindings are plain data (service name, strip flag, deadline); dispatch
//!   stays data-driven instead of capturing per-route closures
//! - Build aborts on the first violation so a generation is all-or-nothing

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::RESERVED_BASE_PATHS;
use crate::routing::method::{resolve_methods, MethodError};
use crate::routing::path::{compile_path, PathError};

/// Routing table construction errors.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("at least one service must be configured")]
    NoServices,

    #[error("service[{service}]: name cannot be empty")]
    EmptyServiceName { service: usize },

    #[error("service[{service}]: duplicate service name '{name}'")]
    DuplicateService { service: usize, name: String },

    #[error("service[{service}]: duplicate base path '{path}'")]
    DuplicateBasePath { service: usize, path: String },

    #[error("service[{service}]: base path '{path}' is reserved for gateway use")]
    ReservedBasePath { service: usize, path: String },

    #[error("service[{service}]: at least one route must be configured")]
    NoRoutes { service: usize },

    #[error("service[{service}].route[{route}]: at least one HTTP method must be specified")]
    NoMethods { service: usize, route: usize },

    #[error("service[{service}].route[{route}]: timeout must be greater than 0")]
    ZeroTimeout { service: usize, route: usize },

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

    #[error("route conflict for {method} '{pattern}': {source}")]
    RouteConflict {
        method: Method,
        pattern: String,
        source: matchit::InsertError,
    },
}

/// Everything dispatch needs to know about a matched route.
#[derive(Debug, Clone)]
pub struct RouteBinding {
    /// Owning service, used for registry lookup and logging.
    pub service: String,

    /// Strip the service base path before forwarding.
    pub strip_path: bool,

    /// Per-request deadline. `None` means the backend is waited on
    /// indefinitely.
    pub timeout: Option<Duration>,

    /// Compiled pattern, kept for logging.
    pub pattern: String,
}

/// Immutable compiled route table.
///
/// Patterns are compiled into one [`matchit::Router`] per HTTP method. The
/// routers store indices into a shared binding list so that a route
/// registered for several methods has exactly one binding.
#[derive(Debug)]
pub struct RoutingTable {
    routers: HashMap<Method, matchit::Router<usize>>,
    bindings: Vec<RouteBinding>,
}

impl RoutingTable {
    /// Compile service configs into a routing table.
    ///
    /// Fails on the first duplicate, reserved, malformed or ambiguous
    /// entry. On failure nothing is returned, so a half-built table can
    /// never be observed.
    pub fn build(services: &[ServiceConfig]) -> Result<Self, BuildError> {
        if services.is_empty() {
            return Err(BuildError::NoServices);
        }

        let mut seen_names: HashSet<&str> = HashSet::new();
        let mut seen_base_paths: HashSet<&str> = HashSet::new();
        let mut routers: HashMap<Method, matchit::Router<usize>> = HashMap::new();
        let mut bindings: Vec<RouteBinding> = Vec::new();

        for (si, service) in services.iter().enumerate() {
            if service.name.is_empty() {
                return Err(BuildError::EmptyServiceName { service: si });
            }
            if !seen_names.insert(&service.name) {
                return Err(BuildError::DuplicateService {
                    service: si,
                    name: service.name.clone(),
                });
            }
            if RESERVED_BASE_PATHS.contains(&service.base_path.as_str()) {
                return Err(BuildError::ReservedBasePath {
                    service: si,
                    path: service.base_path.clone(),
                });
            }
            if !seen_base_paths.insert(&service.base_path) {
                return Err(BuildError::DuplicateBasePath {
                    service: si,
                    path: service.base_path.clone(),
                });
            }
            if service.routes.is_empty() {
                return Err(BuildError::NoRoutes { service: si });
            }

            for (ri, route) in service.routes.iter().enumerate() {
                if route.methods.is_empty() {
                    return Err(BuildError::NoMethods {
                        service: si,
                        route: ri,
                    });
                }
                if route.timeout == Some(0) {
                    return Err(BuildError::ZeroTimeout {
                        service: si,
                        route: ri,
                    });
                }

                let methods = resolve_methods(&route.methods).map_err(|source| {
                    BuildError::Method {
                        service: si,
                        route: ri,
                        source,
                    }
                })?;
                let pattern =
                    compile_path(&service.base_path, &route.path).map_err(|source| {
                        BuildError::Path {
                            service: si,
                            route: ri,
                            source,
                        }
                    })?;

                let index = bindings.len();
                bindings.push(RouteBinding {
                    service: service.name.clone(),
                    strip_path: route.strip_path,
                    timeout: route.timeout.map(Duration::from_secs),
                    pattern: pattern.clone(),
                });

                for method in methods {
                    let router = routers
                        .entry(method.clone())
                        .or_insert_with(matchit::Router::new);
                    router
                        .insert(pattern.clone(), index)
                        .map_err(|source| BuildError::RouteConflict {
                            method: method.clone(),
                            pattern: pattern.clone(),
                            source,
                        })?;
                    tracing::debug!(
                        method = %method,
                        pattern = %pattern,
                        service = %service.name,
                        "Route registered"
                    );
                }
            }
        }

        Ok(Self { routers, bindings })
    }

    /// Look up the binding for a request, or `None` if nothing matches.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<&RouteBinding> {
        let router = self.routers.get(method)?;
        let matched = router.at(path).ok()?;
        self.bindings.get(*matched.value)
    }

    /// Number of configured routes (not method expansions).
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
