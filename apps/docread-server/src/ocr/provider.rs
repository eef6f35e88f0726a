//! OCR Providers
//!
//! Defines the engine trait and implementations for the OCR backends.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;

use super::types::{OcrError, OcrProvider, OcrResult};

/// OCR engine trait
///
/// Engines hold only immutable configuration and may be called
/// concurrently.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Recognize all text in the image at `image_path`
    async fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Split engine output into trimmed, non-empty line fragments
fn line_fragments(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tesseract OCR provider
///
/// Runs the `tesseract` CLI, which uses the CPU only.
pub struct TesseractProvider {
    /// Binary name or path
    command: String,
    /// Language codes joined with `+`, e.g. `eng+deu`
    languages: String,
}

impl TesseractProvider {
    pub fn new(command: &str, languages: &[String]) -> Self {
        Self {
            command: command.to_string(),
            languages: languages.join("+"),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        tokio::process::Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        // Writing to "stdout" avoids a second temporary file
        let output = tokio::process::Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            // A timed-out request must not leave tesseract running
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);

        Ok(OcrResult {
            fragments: line_fragments(&text),
            provider: OcrProvider::Tesseract,
        })
    }
}

/// Ollama vision model provider
pub struct OllamaProvider {
    client: reqwest::Client,
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
    /// Language hint included in the prompt
    languages: Vec<String>,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, languages: &[String]) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            languages: languages.to_vec(),
        }
    }

    fn prompt(&self) -> String {
        let lang_hint = if self.languages.is_empty() {
            String::new()
        } else {
            format!(" The text is in {}.", self.languages.join(", "))
        };

        format!(
            "Extract all text from this image exactly as written.{} Return only the extracted text, nothing else.",
            lang_hint
        )
    }
}

#[async_trait]
impl OcrEngine for OllamaProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Ollama
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let image_data = tokio::fs::read(image_path)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to read image: {}", e)))?;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(&image_data);

        let request = serde_json::json!({
            "model": self.model,
            "prompt": self.prompt(),
            "images": [image_base64],
            "stream": false,
            "options": { "temperature": 0 }
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = result["response"].as_str().unwrap_or("");

        Ok(OcrResult {
            fragments: line_fragments(text),
            provider: OcrProvider::Ollama,
        })
    }
}
