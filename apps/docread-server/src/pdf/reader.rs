//! PDF reader traits

use std::path::Path;

use thiserror::Error;

/// PDF reader errors
#[derive(Debug, Error)]
pub enum PdfError {
    /// The file could not be opened as a PDF
    #[error("Invalid or corrupt PDF: {0}")]
    Corrupt(String),

    #[error("Failed to extract text from page {page}: {message}")]
    PageText { page: u32, message: String },
}

impl PdfError {
    /// Whether the error was caused by the uploaded content
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

pub type PdfResult<T> = std::result::Result<T, PdfError>;

/// Opens PDF files for text extraction
///
/// Implementations are blocking and are called from
/// `tokio::task::spawn_blocking`.
pub trait PdfTextReader: Send + Sync {
    /// Open the PDF at `path`
    ///
    /// Fails with [`PdfError::Corrupt`] when the file is not a readable PDF.
    fn open<'a>(&'a self, path: &Path) -> PdfResult<Box<dyn PdfPages + 'a>>;
}

/// An opened PDF
pub trait PdfPages {
    fn page_count(&self) -> usize;

    /// Plain text of a 1-based page, `None` if the page has no text layer
    fn page_text(&self, page: u32) -> PdfResult<Option<String>>;
}
