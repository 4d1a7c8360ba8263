use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gsbot_core::types::Snowflake;
use gsbot_engine::HandleError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`HandleError`] from the engine and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error("No purge is awaiting confirmation in group {group_id}")]
    NoPendingConfirmation { group_id: Snowflake },

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn internal(err: &HandleError) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Internal engine error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        err.code(),
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Handle(err) => match err {
                HandleError::NotFound { .. } => (StatusCode::NOT_FOUND, err.code(), err.to_string()),
                HandleError::Unauthorized { .. } => {
                    (StatusCode::FORBIDDEN, err.code(), err.to_string())
                }
                HandleError::InvalidParameter { .. } => {
                    (StatusCode::BAD_REQUEST, err.code(), err.to_string())
                }
                HandleError::UploadFailure { .. } => {
                    tracing::warn!(error = %err, "Image upload failed");
                    (StatusCode::BAD_GATEWAY, err.code(), err.to_string())
                }
                HandleError::Timeout { .. } => {
                    (StatusCode::REQUEST_TIMEOUT, err.code(), err.to_string())
                }
                HandleError::Cancelled { .. } | HandleError::Conflict { .. } => {
                    (StatusCode::CONFLICT, err.code(), err.to_string())
                }
                HandleError::StoreReadFailure { .. }
                | HandleError::StoreWriteFailure { .. }
                | HandleError::Internal { .. } => internal(err),
            },
            AppError::NoPendingConfirmation { .. } => (
                StatusCode::NOT_FOUND,
                "NO_PENDING_CONFIRMATION",
                self.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
