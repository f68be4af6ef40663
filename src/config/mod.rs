//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into a routing generation
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → validated config pushed to the reload coordinator
//!     → coordinator builds and atomically swaps the active generation
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - Server and observability sections have defaults; services are explicit
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload never disturbs the running gateway

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::GatewayConfig;
pub use schema::RouteConfig;
pub use schema::ServiceConfig;
