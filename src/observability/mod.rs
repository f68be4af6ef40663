//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing events
//! - Request ID flows through every log line of a request
//! - Metrics are cheap (atomic increments)
//! - Request failures are events, never panics; the listener stays up

pub mod logging;
pub mod metrics;
