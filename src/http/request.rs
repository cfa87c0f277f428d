//! Request description and self-execution.
//!
//! # Responsibilities
//! - Describe one HTTP call (method, endpoint, body, extra headers)
//! - Validate the description before any I/O
//! - Execute itself against a client capability
//!
//! # Design Decisions
//! - The body stays typed until execution so encoding failures surface as
//!   call errors, before any network I/O
//! - Caller headers never carry credentials; `Authorization` is dropped and
//!   injected by the executor
//! - A request only runs against the concrete client it knows; anything else
//!   is a guarded error, not a panic

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::http::client::{HttpClient, RancherClient};
use crate::http::executor;
use crate::http::response::RawResponse;

/// A request that knows how to execute itself against a client.
#[async_trait]
pub trait RancherRequest: Send + Sync {
    /// Execute and return the final response with its status and headers.
    async fn send(&self, cx: &Context, client: &dyn RancherClient) -> Result<RawResponse>;

    /// Execute and return only the raw response body.
    async fn do_request(&self, cx: &Context, client: &dyn RancherClient) -> Result<Bytes> {
        self.send(cx, client).await.map(|response| response.body)
    }
}

/// One HTTP call against the management API.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest<B = serde_json::Value> {
    /// HTTP method.
    pub method: Method,
    /// Absolute endpoint URL.
    pub endpoint: String,
    /// Body serialized to JSON at execution time. `None` sends an empty body.
    pub body: Option<B>,
    /// Extra headers merged into the outgoing request.
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    /// A bodiless request.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }
}

impl<B> HttpRequest<B> {
    /// Attach a body, replacing any previous one.
    pub fn with_body<C>(self, body: C) -> HttpRequest<C> {
        HttpRequest {
            method: self.method,
            endpoint: self.endpoint,
            body: Some(body),
            headers: self.headers,
        }
    }

    /// Add an extra header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Check the request can be sent, returning the parsed endpoint.
    pub fn validate(&self) -> Result<Url> {
        if self.endpoint.is_empty() {
            return Err(ClientError::InvalidRequest("URL is empty".to_string()));
        }
        Url::parse(&self.endpoint).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid URL '{}': {}", self.endpoint, e))
        })
    }

    /// Caller headers as a header map, without any `Authorization`.
    pub(crate) fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ClientError::InvalidRequest(format!("invalid header name ({}): {}", name, e))
            })?;
            if name == AUTHORIZATION {
                tracing::debug!("Dropping caller-supplied Authorization header");
                continue;
            }
            let value = HeaderValue::from_str(value).map_err(|e| {
                ClientError::InvalidRequest(format!("invalid header value for {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl<B: Serialize> HttpRequest<B> {
    /// Encode the body as JSON, if there is one.
    pub(crate) fn encode_body(&self) -> Result<Option<Bytes>> {
        self.body
            .as_ref()
            .map(|body| {
                serde_json::to_vec(body)
                    .map(Bytes::from)
                    .map_err(ClientError::Serialization)
            })
            .transpose()
    }
}

#[async_trait]
impl<B: Serialize + Send + Sync> RancherRequest for HttpRequest<B> {
    async fn send(&self, cx: &Context, client: &dyn RancherClient) -> Result<RawResponse> {
        if let Err(e) = self.validate() {
            tracing::error!(method = %self.method, endpoint = %self.endpoint, error = %e, "Doing request failed");
            return Err(e);
        }

        let Some(client) = client.as_any().downcast_ref::<HttpClient>() else {
            let e = ClientError::CapabilityMismatch {
                expected: std::any::type_name::<HttpClient>(),
            };
            tracing::error!(method = %self.method, endpoint = %self.endpoint, error = %e, "Doing request failed");
            return Err(e);
        };

        executor::execute(cx, client, self).await
    }
}
