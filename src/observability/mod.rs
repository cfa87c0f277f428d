//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Executor produces:
//!     → tracing events (request object, response time/status/headers/body, failures)
//!     → metrics.rs (request counters, latency histogram, error counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr), installed by binaries
//!     → Any `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers and recorders is the
//!   caller's decision
//! - Without a recorder installed, metric updates are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
