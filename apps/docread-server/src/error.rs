//! Error types for the DocRead server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::IntakeError;
use crate::extract::ExtractError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body is not the expected JSON shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Intake(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            AppError::Extract(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status.is_server_error() {
            tracing::error!("Processing error: {}", self);
            format!("An error occurred while processing the document: {}", self)
        } else {
            tracing::warn!("Rejected request: {}", self);
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
