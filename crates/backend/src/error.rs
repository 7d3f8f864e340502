//! Unified error handling for the JSON and admin endpoints.
//!
//! Handlers return `ApiResult<T>` and use `?`; the conversion to a response
//! picks the status code and never puts internal error text in the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::directory::DirectoryError;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Storage or other infrastructure failure
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// User directory failure or conflict
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Directory(DirectoryError::Unavailable(e)) => {
                tracing::error!("User directory error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "User directory unavailable".to_string(),
                )
            }
            ApiError::Directory(DirectoryError::AlreadyExists(_)) => {
                (StatusCode::CONFLICT, "User already exists".to_string())
            }
            ApiError::Directory(DirectoryError::ReadOnly) => (
                StatusCode::NOT_IMPLEMENTED,
                "Users are managed through the configured allow-list".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details: None,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
