//! Per-call transport construction.
//!
//! # Responsibilities
//! - Compose the TLS configuration, proxy settings and timeout into a client
//! - Disable automatic redirects (the executor follows them itself)
//!
//! # Design Decisions
//! - A fresh transport per call: no connection state shared across calls
//! - Proxy settings come from the environment unless disabled in config

use reqwest::redirect::Policy;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Build the transport used for a single call.
pub fn build_transport(config: &ClientConfig, tls: rustls::ClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .use_preconfigured_tls(tls)
        .redirect(Policy::none());

    if let Some(timeout) = config.call_timeout() {
        builder = builder.timeout(timeout);
    }

    if !config.use_env_proxy {
        builder = builder.no_proxy();
    }

    builder.build().map_err(ClientError::Transport)
}
