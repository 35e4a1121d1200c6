//! HTTP error mapping for the session routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatnest_domain::DomainError;
use serde_json::json;
use tracing::{debug, error};

/// Shown when a session id is unknown.
pub const SESSION_NOT_FOUND: &str = "找不到该会话";

/// Shown when a replace targets an unknown session or carries bad data.
pub const SESSION_OR_DATA_INVALID: &str = "会话不存在或数据无效";

/// Error response with a `{"error": "..."}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Map a domain error, using `not_found` as the client-facing message
    /// for missing sessions and invalid payloads.
    pub fn from_domain(err: DomainError, not_found: &str) -> Self {
        match err {
            DomainError::NotFound(_) | DomainError::InvalidInput(_) => {
                debug!("Rejecting request: {}", err);
                Self::not_found(not_found)
            }
            other => {
                error!("Session store failure: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
