//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ClientConfig
//!     → tls.rs (trust store + rustls client config, insecure override)
//!     → transport.rs (reqwest client: TLS, proxy env, timeout, no auto-redirect)
//!     → Hand off to the HTTP executor
//! ```
//!
//! # Design Decisions
//! - Everything here is rebuilt per call; nothing is cached across calls
//! - Trust store failures degrade, they never abort a call

pub mod tls;
pub mod transport;

pub use tls::{build_root_store, build_tls_config};
pub use transport::build_transport;
