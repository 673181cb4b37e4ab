use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::thesis::cycle::CycleError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream generation failed. The message is shown to the user verbatim.
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CycleError> for AppError {
    fn from(err: CycleError) -> Self {
        match err {
            CycleError::EmptyTopic(message) => AppError::Validation(message.to_string()),
            CycleError::AlreadyPending => AppError::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "A valid session is required".to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "GENERATION_PENDING", msg.clone()),
            AppError::Generation(msg) => {
                tracing::warn!("Generation error: {msg}");
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
