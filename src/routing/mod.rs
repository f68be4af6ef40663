//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → table.rs (per-method match tree lookup)
//!     → Return: matched RouteBinding or NoMatch
//!
//! Route Compilation (at startup and on reload):
//!     ServiceConfig[]
//!     → method.rs (expand method tokens / group aliases)
//!     → path.rs (join base path + route path, validate segments)
//!     → table.rs (insert into per-method match trees, reject conflicts)
//!     → Freeze as immutable RoutingTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at build time, immutable at runtime
//! - No regex in hot path (radix-tree matching only)
//! - Deterministic: same input always matches same route
//! - Ambiguity is a build error, never a runtime tiebreak

pub mod method;
pub mod path;
pub mod table;

pub use table::{BuildError, RouteBinding, RoutingTable};
