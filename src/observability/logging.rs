//! Structured logging.
//!
//! # Responsibilities
//! - Install a `tracing` subscriber for binaries and tools
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the level passed in
//! - Logs go to stderr so stdout stays clean for response bodies

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber at `level` (e.g. `"info"`, `"debug"`).
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(level).into());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

fn default_directives(level: &str) -> String {
    format!("rancher_client={level},rancher_cli={level}")
}
