// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::DeletionError;

/// Failure responses of the deletion endpoint. Every kind maps to 400; only the message differs.
#[derive(Debug)]
pub enum ApiError {
    /// Credential missing, invalid, or not resolvable to a user
    Unauthorized,

    /// Identity provider refused to remove the account; carries the full message
    DeletionFailed(String),

    /// Anything else raised while processing, message passed through verbatim
    Unexpected(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::BAD_REQUEST,
            ApiError::DeletionFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Unexpected(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::DeletionFailed(msg) => msg,
            ApiError::Unexpected(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        ApiError::Unexpected(message.into())
    }
}

impl From<DeletionError> for ApiError {
    fn from(err: DeletionError) -> Self {
        match err {
            DeletionError::Unauthorized(_) => ApiError::Unauthorized,
            DeletionError::IdentityRemoval(_) => ApiError::DeletionFailed(err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
