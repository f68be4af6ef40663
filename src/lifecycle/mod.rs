//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build initial generation → Start watcher
//!     → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routing state, listener last
//! - Ordered shutdown: stop accept, drain, close
//! - One broadcast channel fans the shutdown signal out to every task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
