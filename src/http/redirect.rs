//! Redirect following.
//!
//! # Responsibilities
//! - Count hops per call and enforce the configured ceiling
//! - Turn a 3xx response into the next hop (method, URL, body)
//!
//! # State Machine
//! ```text
//! hops_followed = 0
//!     → 3xx with Location:
//!         hops_followed >= max  → TooManyRedirects (terminal)
//!         otherwise             → hops_followed += 1, issue next hop
//!     → any other response      → done (terminal)
//! ```

use bytes::Bytes;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{ClientError, Result};

/// Per-call redirect budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectState {
    max_redirects: u32,
    hops_followed: u32,
}

impl RedirectState {
    pub fn new(max_redirects: u32) -> Self {
        Self {
            max_redirects,
            hops_followed: 0,
        }
    }

    /// Number of hops followed so far.
    pub fn hops_followed(&self) -> u32 {
        self.hops_followed
    }

    /// Account for one more hop, failing once the budget is spent.
    pub fn follow(&mut self) -> Result<()> {
        if self.hops_followed >= self.max_redirects {
            return Err(ClientError::TooManyRedirects {
                max: self.max_redirects,
            });
        }
        self.hops_followed += 1;
        Ok(())
    }
}

/// One request on the way to a final response.
#[derive(Debug, Clone)]
pub struct Hop {
    pub method: Method,
    pub url: Url,
    pub body: Option<Bytes>,
}

/// Whether `status` asks the client to re-issue the request elsewhere.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Compute the hop that follows `current` for a redirect response.
///
/// Returns `None` when the response is not a redirect or carries no usable
/// `Location`; such a response is final. 301/302/303 turn anything but GET and
/// HEAD into a bodiless GET, 307/308 keep the method and body.
pub fn next_hop(status: StatusCode, headers: &HeaderMap, current: &Hop) -> Option<Hop> {
    if !is_redirect(status) {
        return None;
    }

    let location = headers.get(LOCATION)?.to_str().ok()?;
    let url = match current.url.join(location) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(location, error = %e, "Ignoring redirect with unusable Location");
            return None;
        }
    };

    let (method, body) = match status {
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => {
            (current.method.clone(), current.body.clone())
        }
        _ if current.method == Method::GET || current.method == Method::HEAD => {
            (current.method.clone(), None)
        }
        _ => (Method::GET, None),
    };

    Some(Hop { method, url, body })
}
