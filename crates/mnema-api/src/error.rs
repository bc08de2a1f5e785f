//! Translation of pipeline errors into HTTP responses.
//!
//! Client-caused errors carry their message through; everything
//! upstream or internal collapses to a generic body so raw model and
//! service error text never reaches the caller.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use mnema_core::Error;

/// API-level error: a status code plus the message serialized as
/// `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => Self::new(StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            Error::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            Error::RateLimited(_) => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Upstream service is rate limiting requests",
            ),
            Error::Upstream(msg) => {
                error!(error = %msg, "Upstream failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An upstream service failed",
                )
            }
            other => {
                error!(error = %other, "Internal failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred",
                )
            }
        }
    }
}

/// Malformed request bodies (missing fields, invalid JSON, wrong
/// content type) are client errors, so they map to 400 with the usual
/// `{"error": ...}` body instead of axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let api: ApiError = Error::Validation("query too short".to_string()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "query too short");

        let api: ApiError = Error::Forbidden("not yours".to_string()).into();
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.message, "not yours");
    }

    #[test]
    fn test_upstream_text_never_surfaces() {
        let api: ApiError =
            Error::Upstream("connection refused to 10.0.0.5:11434".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_rate_limit_maps_to_429() {
        let api: ApiError = Error::RateLimited("429 from ollama".to_string()).into();
        assert_eq!(api.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(!api.message.contains("ollama"));
    }

    #[test]
    fn test_storage_and_internal_map_to_500() {
        let api: ApiError = Error::Storage("missing object key abc".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        let api: ApiError = Error::Internal("oops".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
