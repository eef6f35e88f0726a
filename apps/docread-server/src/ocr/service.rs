//! OCR Service
//!
//! Process-wide OCR entry point. Built once at startup and never mutated.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{
    provider::{OcrEngine, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrProvider, OcrResult},
};

/// OCR service configuration
#[derive(Debug, Clone)]
pub struct OcrServiceConfig {
    /// Backend to use
    pub provider: OcrProvider,
    /// Fixed language set
    pub languages: Vec<String>,
    /// Tesseract binary
    pub tesseract_cmd: String,
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
    /// Allow at most one recognition in flight
    pub serialize: bool,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            provider: OcrProvider::Tesseract,
            languages: vec!["eng".to_string()],
            tesseract_cmd: "tesseract".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            serialize: false,
        }
    }
}

/// OCR service shared by all requests
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    /// Present when the engine must not run concurrently
    gate: Option<Mutex<()>>,
}

impl OcrService {
    /// Create the service for the configured provider
    pub fn new(config: &OcrServiceConfig) -> Self {
        let engine: Arc<dyn OcrEngine> = match config.provider {
            OcrProvider::Tesseract => Arc::new(TesseractProvider::new(
                &config.tesseract_cmd,
                &config.languages,
            )),
            OcrProvider::Ollama => Arc::new(OllamaProvider::new(
                &config.ollama_url,
                &config.ollama_model,
                &config.languages,
            )),
        };

        Self::with_engine(engine, config.serialize)
    }

    /// Create the service around an existing engine
    pub fn with_engine(engine: Arc<dyn OcrEngine>, serialize: bool) -> Self {
        Self {
            engine,
            gate: serialize.then(|| Mutex::new(())),
        }
    }

    pub fn provider(&self) -> OcrProvider {
        self.engine.provider_type()
    }

    /// Check the engine and log when it cannot be used
    pub async fn probe(&self) -> bool {
        let available = self.engine.is_available().await;
        if available {
            tracing::info!("OCR provider {:?} is available", self.provider());
        } else {
            tracing::warn!(
                "OCR provider {:?} is not available; image requests will fail",
                self.provider()
            );
        }
        available
    }

    /// Recognize text in an image
    pub async fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let _guard = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let result = self.engine.recognize(image_path).await?;
        tracing::debug!(
            "OCR provider {:?} returned {} fragments",
            result.provider,
            result.fragments.len()
        );
        Ok(result)
    }
}
