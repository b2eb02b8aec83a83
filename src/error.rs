//! Shared error types for the chat engine and its handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected input: empty content/author, content over the length limit.
    /// Never retried automatically; no partial state change occurs.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The storage collaborator is unreachable. The caller may retry the
    /// whole request.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "ValidationError", "message": reason })),
            )
                .into_response(),
            Error::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Unavailable", "message": "storage unavailable" })),
            )
                .into_response(),
        }
    }
}
