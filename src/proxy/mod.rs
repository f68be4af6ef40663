//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Matched request + RouteBinding
//!     → registry.rs (service name → ServiceProxy lookup)
//!     → service.rs (URI rewrite, base-path strip, forwarding headers)
//!     → pooled HTTP client → backend
//!     → response tagged with the gateway header, streamed back
//! ```
//!
//! # Design Decisions
//! - One proxy per service, sharing one pooled client per registry
//! - Proxies are immutable; a config change builds a new registry
//! - All forwarding failures surface as typed errors, never panics

pub mod registry;
pub mod service;

pub use registry::{ProxyRegistry, RegistryError};
pub use service::{ProxyError, ServiceProxy};
