//! Document staging
//!
//! Decodes the base64 transport encoding and writes the payload to a
//! scoped temporary file. Image payloads are additionally decoded once to
//! make sure OCR receives a well-formed image.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use tempfile::NamedTempFile;

use super::error::{IntakeError, IntakeResult};
use super::types::DocumentKind;

/// Prefix of every staged temporary file
const TEMP_PREFIX: &str = "docread-";

/// Stages request payloads into a temporary directory
#[derive(Debug, Clone)]
pub struct Intake {
    temp_dir: PathBuf,
}

impl Intake {
    pub fn new(temp_dir: PathBuf) -> Self {
        Self { temp_dir }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Validate, decode and stage a document
    ///
    /// The extension is checked before any decoding happens. On error,
    /// anything already written is removed before returning.
    pub async fn stage(&self, ext: &str, data: String) -> IntakeResult<ScopedDocument> {
        let kind = DocumentKind::from_extension(ext)
            .ok_or_else(|| IntakeError::UnsupportedExtension(ext.to_string()))?;

        let temp_dir = self.temp_dir.clone();

        // Decoding, disk writes and image decoding are all blocking work
        tokio::task::spawn_blocking(move || stage_blocking(kind, &data, &temp_dir))
            .await
            .map_err(|e| IntakeError::Join(e.to_string()))?
    }
}

/// A decoded document backed by a temporary file
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct ScopedDocument {
    kind: DocumentKind,
    file: NamedTempFile,
    size: usize,
}

impl ScopedDocument {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Location of the staged bytes
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Decoded payload size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Delete the temporary file now, reporting failures
    ///
    /// Dropping the document also deletes the file, but silently.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!("Failed to remove temporary file {}: {}", path.display(), e);
        }
    }
}

fn stage_blocking(kind: DocumentKind, data: &str, temp_dir: &Path) -> IntakeResult<ScopedDocument> {
    let bytes = decode_base64(data)?;

    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(kind.suffix())
        .tempfile_in(temp_dir)?;
    file.write_all(&bytes)?;
    file.flush()?;

    let document = ScopedDocument {
        kind,
        file,
        size: bytes.len(),
    };

    if kind.is_image() {
        // `document` is dropped on the error path, removing the file
        verify_image(&bytes)?;
    }

    tracing::debug!(
        "Staged {} bytes at {}",
        document.size,
        document.path().display()
    );

    Ok(document)
}

/// Decode standard base64, ignoring embedded whitespace
fn decode_base64(data: &str) -> IntakeResult<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(Into::into)
}

/// Check that the bytes decode as a supported raster image
fn verify_image(bytes: &[u8]) -> IntakeResult<()> {
    image::load_from_memory(bytes)
        .map(|_| ())
        .map_err(|e| IntakeError::InvalidImage(e.to_string()))
}
