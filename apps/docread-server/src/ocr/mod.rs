//! OCR Module
//!
//! Reads text from raster images.
//!
//! Supports two backends:
//! - Tesseract (local CLI, CPU only)
//! - Ollama vision models (local LLM)
//!
//! A single [`OcrService`] is built at startup with a fixed language set and
//! shared by every request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docread_server::ocr::{OcrService, OcrServiceConfig};
//!
//! let service = OcrService::new(&OcrServiceConfig::default());
//! let result = service.recognize(Path::new("/tmp/scan.png")).await?;
//! println!("{}", result.text());
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrEngine, OllamaProvider, TesseractProvider};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{OcrError, OcrProvider, OcrResult};
