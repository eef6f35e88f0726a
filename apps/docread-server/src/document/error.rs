//! Intake error types

use thiserror::Error;

use super::types::SUPPORTED_EXTENSIONS;

/// Errors raised while validating and staging a document
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid file extension '{0}'. Supported extensions: {}", SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedExtension(String),

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid image file: {0}")]
    InvalidImage(String),

    /// Failed to write the temporary file
    #[error("Failed to stage document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(String),
}

impl IntakeError {
    /// Whether the error was caused by the request content
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedExtension(_) | Self::InvalidBase64(_) | Self::InvalidImage(_)
        )
    }
}

pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
