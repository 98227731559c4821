//! Error handling
//!
//! Library-level errors stay typed (`TableError`, `PipelineError`); only
//! `AppError::into_response` talks HTTP. Decode and pipeline failures are
//! client errors: reported with a message, never retried, never a crash.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::pipeline::PipelineError;
use crate::logic::table::TableError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Malformed request payload (ragged rows, empty table)
    DecodeError(String),

    /// The pipeline rejected the decoded table (missing column, bad shape)
    PipelineError(String),

    /// Request shape valid but not acceptable for the operation
    ValidationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::DecodeError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::PipelineError(msg) => {
                tracing::debug!("Pipeline rejected request: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        AppError::DecodeError(err.to_string())
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::PipelineError(err.to_string())
    }
}
