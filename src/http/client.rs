//! Client capability and the HTTP client implementing it.
//!
//! # Responsibilities
//! - Define the verb-shaped capability requests execute against
//! - Hold connection-level policy (trust, credentials, redirects, timeout)
//!
//! # Design Decisions
//! - Immutable after construction; safe to share across tasks
//! - No transport is kept here, every call builds its own

use std::any::Any;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderValue;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::http::request::RancherRequest;
use crate::http::response::RawResponse;

/// The capability set a request needs from a client.
#[async_trait]
pub trait RancherClient: Send + Sync {
    /// Execute a request, discarding the response body.
    async fn create(&self, cx: &Context, request: &dyn RancherRequest) -> Result<()>;

    /// Execute a request and return the raw response body.
    async fn read(&self, cx: &Context, request: &dyn RancherRequest) -> Result<Bytes>;

    /// Execute a request, discarding the response body.
    async fn update(&self, cx: &Context, request: &dyn RancherRequest) -> Result<()>;

    /// Execute a request, discarding the response body.
    async fn delete(&self, cx: &Context, request: &dyn RancherRequest) -> Result<()>;

    /// Concrete type access, used by requests to check the capability they run against.
    fn as_any(&self) -> &dyn Any;
}

/// HTTP client for the management API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: ClientConfig,
    /// Pre-rendered `Bearer <token>` value, marked sensitive.
    authorization: Option<HeaderValue>,
}

impl HttpClient {
    /// Create a client from a (validated) configuration.
    ///
    /// Fails only if the configured token cannot be sent as a header value.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let authorization = config
            .bearer_token()
            .map(|token| {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    ClientError::InvalidConfig("token contains characters not allowed in a header".to_string())
                })?;
                value.set_sensitive(true);
                Ok::<_, ClientError>(value)
            })
            .transpose()?;

        tracing::debug!(
            api_url = %config.api_url,
            insecure = config.insecure,
            ignore_system_ca = config.ignore_system_ca,
            authenticated = authorization.is_some(),
            max_redirects = config.max_redirects,
            timeout = ?config.call_timeout(),
            "Rancher client created"
        );

        Ok(Self {
            config,
            authorization,
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether calls carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.authorization.is_some()
    }

    pub(crate) fn authorization(&self) -> Option<&HeaderValue> {
        self.authorization.as_ref()
    }

    /// Execute a request and return status, headers and body.
    pub async fn read_response(
        &self,
        cx: &Context,
        request: &dyn RancherRequest,
    ) -> Result<RawResponse> {
        request.send(cx, self).await
    }
}

#[async_trait]
impl RancherClient for HttpClient {
    async fn create(&self, cx: &Context, request: &dyn RancherRequest) -> Result<()> {
        request.do_request(cx, self).await.map(|_| ())
    }

    async fn read(&self, cx: &Context, request: &dyn RancherRequest) -> Result<Bytes> {
        request.do_request(cx, self).await
    }

    async fn update(&self, cx: &Context, request: &dyn RancherRequest) -> Result<()> {
        request.do_request(cx, self).await.map(|_| ())
    }

    async fn delete(&self, cx: &Context, request: &dyn RancherRequest) -> Result<()> {
        request.do_request(cx, self).await.map(|_| ())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_without_token() {
        let client = HttpClient::new(ClientConfig::new("https://rancher.example.com")).unwrap();
        assert!(!client.is_authenticated());
        assert!(client.authorization().is_none());
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let mut config = ClientConfig::new("https://rancher.example.com");
        config.token_key = "token-abc:xyz".into();
        let client = HttpClient::new(config).unwrap();

        let value = client.authorization().unwrap();
        assert_eq!(value, "Bearer token-abc:xyz");
        assert!(value.is_sensitive());
        assert!(!format!("{client:?}").contains("token-abc:xyz"));
    }

    #[test]
    fn key_pair_becomes_bearer_token() {
        let mut config = ClientConfig::new("https://rancher.example.com");
        config.access_key = "token-abc".into();
        config.secret_key = "xyz".into();
        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.authorization().unwrap(), "Bearer token-abc:xyz");
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let mut config = ClientConfig::new("https://rancher.example.com");
        config.token_key = "bad\ntoken".into();
        assert!(matches!(
            HttpClient::new(config),
            Err(ClientError::InvalidConfig(_))
        ));
    }
}
