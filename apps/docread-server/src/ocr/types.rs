//! OCR Types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local)
    #[default]
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl FromStr for OcrProvider {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "ollama" => Ok(Self::Ollama),
            other => Err(OcrError::ProviderNotAvailable(format!(
                "unknown OCR provider '{}'",
                other
            ))),
        }
    }
}

/// OCR result for a whole image
#[derive(Debug, Clone, Serialize)]
pub struct OcrResult {
    /// Recognized text fragments in reading order
    pub fragments: Vec<String>,
    /// Provider used
    pub provider: OcrProvider,
}

impl OcrResult {
    /// Fragments joined with single spaces
    pub fn text(&self) -> String {
        self.fragments.join(" ")
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("API error: {0}")]
    ApiError(String),
}
