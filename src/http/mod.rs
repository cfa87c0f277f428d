//! HTTP execution subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → client.rs (verb: create/read/update/delete, or read_response)
//!     → request.rs (validate, check client capability)
//!     → executor.rs (transport per call, auth on every hop)
//!     → redirect.rs (next hop, redirect budget)
//!     → response.rs (read body, response telemetry)
//!     → Caller gets raw bytes or RawResponse
//! ```

pub mod client;
mod executor;
pub mod redirect;
pub mod request;
pub mod response;

pub use client::{HttpClient, RancherClient};
pub use request::{HttpRequest, RancherRequest};
pub use response::RawResponse;
