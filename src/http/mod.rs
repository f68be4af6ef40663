//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, health endpoint, dispatch handler)
//!     → request.rs (attach request ID)
//!     → generation.rs (active RoutingTable + ProxyRegistry snapshot)
//!     → proxy subsystem forwards to the matched backend
//!     → response streamed back to the client
//!
//! Config updates:
//!     watcher channel → reload.rs → build new generation → atomic swap
//! ```

pub mod generation;
pub mod reload;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::Gateway;
