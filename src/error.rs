//! Error taxonomy for client calls.

use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while executing a request against the management API.
///
/// HTTP 4xx/5xx responses are not errors; they are returned to the caller as
/// successful responses.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request is malformed (empty endpoint, bad URL, bad header).
    #[error("Doing request: invalid request: {0}")]
    InvalidRequest(String),

    /// The client configuration cannot be used to issue requests.
    #[error("Doing request: invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The request was executed against a client it does not know how to drive.
    #[error("Doing request: invalid rancher client type, expected {expected}")]
    CapabilityMismatch { expected: &'static str },

    /// The request body could not be encoded as JSON.
    #[error("Doing request: error marshalling body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The TLS client configuration could not be built.
    #[error("Doing request: building TLS configuration: {0}")]
    Tls(String),

    /// DNS, connect, TLS handshake or other network failure.
    #[error("Doing request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The configured client timeout elapsed before the call completed.
    #[error("Doing request: timed out after {0:?}")]
    Timeout(Duration),

    /// The call was cancelled through its context.
    #[error("Doing request: context cancelled")]
    Cancelled,

    /// The context deadline passed before the call completed.
    #[error("Doing request: context deadline exceeded")]
    DeadlineExceeded,

    /// The server redirected more often than allowed.
    #[error("Stopped after {max} redirects")]
    TooManyRedirects { max: u32 },

    /// The response body could not be read.
    #[error("Doing request: reading response body: {0}")]
    Read(#[source] reqwest::Error),
}

impl ClientError {
    /// Short, stable label for the error category (used for metrics).
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::InvalidRequest(_) => "invalid_request",
            ClientError::InvalidConfig(_) => "invalid_config",
            ClientError::CapabilityMismatch { .. } => "capability_mismatch",
            ClientError::Serialization(_) => "serialization",
            ClientError::Tls(_) => "tls",
            ClientError::Transport(_) => "transport",
            ClientError::Timeout(_) => "timeout",
            ClientError::Cancelled => "cancelled",
            ClientError::DeadlineExceeded => "deadline_exceeded",
            ClientError::TooManyRedirects { .. } => "too_many_redirects",
            ClientError::Read(_) => "read",
        }
    }

    /// Classify a reqwest failure, reporting an elapsed client timeout as
    /// [`ClientError::Timeout`] and anything else through `wrap`.
    pub(crate) fn from_reqwest(
        err: reqwest::Error,
        timeout: Option<Duration>,
        wrap: fn(reqwest::Error) -> ClientError,
    ) -> ClientError {
        match timeout {
            Some(timeout) if err.is_timeout() => ClientError::Timeout(timeout),
            _ => wrap(err),
        }
    }

    /// Renders the error together with its full source chain.
    ///
    /// `reqwest` keeps the interesting part (connection refused, unknown
    /// issuer, ...) in the source chain rather than in its own message.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
