//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::source::{InvalidRecord, SourceError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Validation errors
    InvalidRecords(Vec<InvalidRecord>),

    // Data source errors
    DataSource(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            AppError::InvalidRecords(invalid) => {
                tracing::warn!("{} student record(s) failed validation", invalid.len());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Student data failed validation",
                    Some(invalid),
                )
            }
            AppError::DataSource(msg) => {
                tracing::error!("Data source error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Student data source unavailable", None)
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = match details {
            Some(details) => json!({
                "error": error_message,
                "status": status.as_u16(),
                "details": details,
            }),
            None => json!({
                "error": error_message,
                "status": status.as_u16()
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidRecords(invalid) => AppError::InvalidRecords(invalid),
            other => AppError::DataSource(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}
