//! Configuration management for DocRead Server

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ocr::{OcrProvider, OcrServiceConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub extract: ExtractConfig,
    pub ocr: OcrServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit; base64 inflates payloads by a third
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Staging directory, system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl ExtractConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_body_bytes: 50 * 1024 * 1024,
            },
            extract: ExtractConfig {
                temp_dir: None,
                timeout_secs: 120,
            },
            ocr: OcrServiceConfig::default(),
        }
    }
}

impl Config {
    /// Load from environment variables, using defaults for anything unset
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    ///
    /// Values that fail to parse are logged and replaced by their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(&lookup, "SERVER_PORT", defaults.server.port),
                max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", defaults.server.max_body_bytes),
            },
            extract: ExtractConfig {
                temp_dir: lookup("DOCREAD_TEMP_DIR")
                    .filter(|dir| !dir.trim().is_empty())
                    .map(PathBuf::from),
                timeout_secs: parse_or(
                    &lookup,
                    "EXTRACT_TIMEOUT_SECS",
                    defaults.extract.timeout_secs,
                ),
            },
            ocr: OcrServiceConfig {
                provider: parse_or::<OcrProvider, _>(&lookup, "OCR_PROVIDER", defaults.ocr.provider),
                languages: lookup("OCR_LANGUAGES")
                    .map(|langs| parse_languages(&langs))
                    .filter(|langs| !langs.is_empty())
                    .unwrap_or(defaults.ocr.languages),
                tesseract_cmd: lookup("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                ollama_url: lookup("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
                serialize: parse_or(&lookup, "OCR_SERIALIZE", defaults.ocr.serialize),
            },
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value '{}' for {}, using default", raw, key);
            default
        }),
        None => default,
    }
}

/// Split `eng+deu` or `eng, deu` into language codes
fn parse_languages(raw: &str) -> Vec<String> {
    raw.split(|c| c == '+' || c == ',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}
