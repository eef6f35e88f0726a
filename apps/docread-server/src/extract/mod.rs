//! Extraction Dispatcher
//!
//! Routes a staged document to the PDF text layer or to OCR depending on
//! its declared kind, scoped to the requested pages.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::document::{DocumentKind, ScopedDocument};
use crate::ocr::{OcrError, OcrService};
use crate::pages::{select, NormalizedPageSet};
use crate::pdf::{PdfError, PdfTextReader};

/// Returned for image requests that do not include page 1
pub const IMAGE_PAGE_MESSAGE: &str =
    "Image files have exactly one page. Request pages \"ALL\" or \"1\".";

/// Extracted text, plus the page count when no requested page exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
}

impl ExtractionResult {
    fn text(content: String) -> Self {
        Self {
            content,
            total_pages: None,
        }
    }

    fn no_valid_pages(total_pages: usize) -> Self {
        Self {
            content: format!(
                "None of the requested pages exist. The document has {} page(s).",
                total_pages
            ),
            total_pages: Some(total_pages),
        }
    }
}

/// Extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),

    #[error("Extraction was cancelled")]
    Cancelled,

    #[error("Task join error: {0}")]
    Join(String),
}

impl ExtractError {
    /// Whether the error was caused by the uploaded content
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Pdf(e) => e.is_user_error(),
            _ => false,
        }
    }
}

/// Dispatches documents to the configured extractors
pub struct Extractor {
    pdf: Arc<dyn PdfTextReader>,
    ocr: Arc<OcrService>,
    timeout: Duration,
}

impl Extractor {
    pub fn new(pdf: Arc<dyn PdfTextReader>, ocr: Arc<OcrService>, timeout: Duration) -> Self {
        Self { pdf, ocr, timeout }
    }

    pub fn ocr(&self) -> &OcrService {
        &self.ocr
    }

    /// Extract text from the selected pages of a staged document
    pub async fn extract(
        &self,
        document: &ScopedDocument,
        pages: &NormalizedPageSet,
    ) -> Result<ExtractionResult, ExtractError> {
        let work = async {
            match document.kind() {
                DocumentKind::Pdf => self.extract_pdf(document.path(), pages).await,
                DocumentKind::Image(_) => self.extract_image(document.path(), pages).await,
            }
        };

        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| ExtractError::Timeout(self.timeout.as_secs()))?
    }

    async fn extract_pdf(
        &self,
        path: &Path,
        pages: &NormalizedPageSet,
    ) -> Result<ExtractionResult, ExtractError> {
        let reader = self.pdf.clone();
        let path = path.to_path_buf();
        let pages = pages.clone();

        // Dropping this future on timeout stops the blocking task at the next
        // page, which releases the reader lock.
        let cancel = CancelOnDrop::default();
        let flag = cancel.flag();

        // MuPDF operations are CPU-bound
        let result = tokio::task::spawn_blocking(move || {
            extract_pdf_text(reader.as_ref(), &path, &pages, &flag)
        })
        .await
        .map_err(|e| ExtractError::Join(e.to_string()))?;

        drop(cancel);
        result
    }

    async fn extract_image(
        &self,
        path: &Path,
        pages: &NormalizedPageSet,
    ) -> Result<ExtractionResult, ExtractError> {
        if !pages.contains(1) {
            return Ok(ExtractionResult::text(IMAGE_PAGE_MESSAGE.to_string()));
        }

        if let NormalizedPageSet::Pages(requested) = pages {
            if requested.len() > 1 {
                tracing::warn!(
                    "Image has a single page; ignoring requested pages {}",
                    pages
                );
            }
        }

        let result = self.ocr.recognize(path).await?;
        Ok(ExtractionResult::text(result.text()))
    }
}

/// Sets its flag when dropped
#[derive(Default)]
struct CancelOnDrop(Arc<AtomicBool>);

impl CancelOnDrop {
    fn flag(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Read the text layer of the selected pages
///
/// Each page is preceded by a `--- Page <n> ---` marker. A selection with no
/// page inside the document returns the page count instead of text.
///
/// `cancelled` is checked before every page; a page that is already being
/// read runs to completion.
pub fn extract_pdf_text(
    reader: &dyn PdfTextReader,
    path: &Path,
    pages: &NormalizedPageSet,
    cancelled: &AtomicBool,
) -> Result<ExtractionResult, ExtractError> {
    let document = reader.open(path)?;
    let total_pages = document.page_count();
    let selected = select(pages, total_pages);

    if selected.is_empty() && !pages.is_all() {
        tracing::warn!(
            "No requested page exists in a {}-page document (requested {})",
            total_pages,
            pages
        );
        return Ok(ExtractionResult::no_valid_pages(total_pages));
    }

    let mut content = String::new();
    for page in selected.iter() {
        if cancelled.load(Ordering::Relaxed) {
            tracing::debug!("Extraction cancelled before page {}", page);
            return Err(ExtractError::Cancelled);
        }
        let text = document.page_text(page)?.unwrap_or_default();
        tracing::debug!("Extracted {} chars from page {}", text.len(), page);
        let _ = write!(content, "--- Page {} ---\n{}\n\n", page, text);
    }

    Ok(ExtractionResult::text(content.trim().to_string()))
}
