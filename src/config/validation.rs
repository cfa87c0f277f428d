//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the API URL is usable for outbound calls
//! - Detect conflicting or half-specified credentials
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is handed to a client

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api_url is required")]
    MissingApiUrl,

    #[error("api_url '{url}' is not a valid URL: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("api_url scheme '{0}' is not supported, expected http or https")]
    UnsupportedScheme(String),

    #[error("access_key and secret_key must be set together")]
    IncompleteKeyPair,

    #[error("token_key conflicts with access_key/secret_key, set only one")]
    ConflictingCredentials,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api_url.trim().is_empty() {
        errors.push(ValidationError::MissingApiUrl);
    } else {
        match Url::parse(&config.api_url) {
            Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidApiUrl {
                url: config.api_url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let has_access = !config.access_key.is_empty();
    let has_secret = !config.secret_key.is_empty();
    if has_access != has_secret {
        errors.push(ValidationError::IncompleteKeyPair);
    }
    if !config.token_key.is_empty() && (has_access || has_secret) {
        errors.push(ValidationError::ConflictingCredentials);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
