//! Configuration schema definitions.
//!
//! This module defines the connection-level configuration handed to
//! [`HttpClient`](crate::http::HttpClient). All fields derive Serde traits for
//! deserialization from config files.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Connection-level configuration for one management API endpoint.
///
/// Immutable once handed to a client.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the management API (e.g., "https://rancher.example.com").
    pub api_url: String,

    /// PEM bundle appended to the trust store.
    pub ca_certs: String,

    /// Start from an empty trust store instead of the OS store.
    pub ignore_system_ca: bool,

    /// Skip server certificate verification entirely. Overrides the trust store.
    pub insecure: bool,

    /// Bearer token. Takes precedence over the access/secret key pair.
    pub token_key: String,

    /// API access key, combined with `secret_key` into a bearer token.
    pub access_key: String,

    /// API secret key.
    pub secret_key: String,

    /// Maximum redirect hops followed per call.
    pub max_redirects: u32,

    /// Ceiling for a whole call, redirects included (e.g. `"30s"`, `"1m 30s"`).
    /// Zero means no ceiling.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_env_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            ca_certs: String::new(),
            ignore_system_ca: false,
            insecure: false,
            token_key: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            max_redirects: 10,
            timeout: Duration::from_secs(30),
            use_env_proxy: true,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `api_url` with default settings.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Ceiling applied to the full round trip, `None` when disabled.
    pub fn call_timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }

    /// The effective bearer credential, if any.
    ///
    /// `token_key` wins; otherwise both halves of the key pair are required and
    /// joined as `access_key:secret_key`.
    pub fn bearer_token(&self) -> Option<String> {
        if !self.token_key.is_empty() {
            return Some(self.token_key.clone());
        }
        if !self.access_key.is_empty() && !self.secret_key.is_empty() {
            return Some(format!("{}:{}", self.access_key, self.secret_key));
        }
        None
    }

    /// Resolve an API path against `api_url`.
    ///
    /// Absolute URLs pass through. Paths starting with `/` are resolved from the
    /// host root; other paths are appended below `api_url`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, url::ParseError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        let mut base = Url::parse(&self.api_url)?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
    }

    /// Every attribute with its rendered value, secrets redacted.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        ATTRIBUTES
            .iter()
            .map(|attr| {
                let value = (attr.get)(self);
                let value = if attr.sensitive && !value.is_empty() {
                    REDACTED.to_string()
                } else {
                    value
                };
                (attr.name, value)
            })
            .collect()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ClientConfig");
        for (name, value) in self.describe() {
            s.field(name, &value);
        }
        s.finish()
    }
}

const REDACTED: &str = "<redacted>";

/// A named configuration attribute with a typed accessor.
#[derive(Clone, Copy)]
pub struct Attribute {
    /// Attribute name as it appears in config files.
    pub name: &'static str,
    /// Whether the value must never be printed.
    pub sensitive: bool,
    /// Renders the attribute's current value.
    pub get: fn(&ClientConfig) -> String,
}

/// All configuration attributes, in file order.
pub const ATTRIBUTES: &[Attribute] = &[
    Attribute {
        name: "api_url",
        sensitive: false,
        get: |c| c.api_url.clone(),
    },
    Attribute {
        name: "ca_certs",
        sensitive: false,
        get: |c| {
            if c.ca_certs.is_empty() {
                String::new()
            } else {
                format!("<pem, {} bytes>", c.ca_certs.len())
            }
        },
    },
    Attribute {
        name: "ignore_system_ca",
        sensitive: false,
        get: |c| c.ignore_system_ca.to_string(),
    },
    Attribute {
        name: "insecure",
        sensitive: false,
        get: |c| c.insecure.to_string(),
    },
    Attribute {
        name: "token_key",
        sensitive: true,
        get: |c| c.token_key.clone(),
    },
    Attribute {
        name: "access_key",
        sensitive: false,
        get: |c| c.access_key.clone(),
    },
    Attribute {
        name: "secret_key",
        sensitive: true,
        get: |c| c.secret_key.clone(),
    },
    Attribute {
        name: "max_redirects",
        sensitive: false,
        get: |c| c.max_redirects.to_string(),
    },
    Attribute {
        name: "timeout",
        sensitive: false,
        get: |c| humantime_serde::re::humantime::format_duration(c.timeout).to_string(),
    },
    Attribute {
        name: "use_env_proxy",
        sensitive: false,
        get: |c| c.use_env_proxy.to_string(),
    },
];
