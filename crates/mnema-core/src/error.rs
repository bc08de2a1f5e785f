//! Error types for mnema.

use thiserror::Error;

/// Result type alias using mnema's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mnema operations.
///
/// Variants map one-to-one onto the client-facing error taxonomy; the
/// API layer translates them into status codes without leaking raw
/// upstream error text.
#[derive(Error, Debug)]
pub enum Error {
    /// Request failed validation before any external call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Authentication missing or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not the owner of the target resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Scope or content item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate-creation race
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream service signalled rate limiting
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream model/service failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model output failed schema validation (recovered locally, never
    /// surfaced to the caller)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Object storage fetch failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            Error::RateLimited(e.to_string())
        } else {
            Error::Upstream(e.to_string())
        }
    }
}
