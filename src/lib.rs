//! Rancher management API client.
//!
//! Executes JSON-over-HTTPS calls against a Rancher server with bearer
//! authentication, configurable TLS trust and bounded redirect following.
//!
//! ```no_run
//! use rancher_client::{ClientConfig, Context, HttpClient, HttpRequest, RancherClient};
//!
//! # async fn run() -> rancher_client::Result<()> {
//! let mut config = ClientConfig::new("https://rancher.example.com");
//! config.token_key = "token-abc:secret".into();
//! let client = HttpClient::new(config)?;
//!
//! let request = HttpRequest::get("https://rancher.example.com/v3/clusters");
//! let body = client.read(&Context::background(), &request).await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod net;
pub mod observability;

pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{ClientError, Result};
pub use http::{HttpClient, HttpRequest, RancherClient, RancherRequest, RawResponse};
