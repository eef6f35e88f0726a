//! MuPDF-backed PDF reader
//!
//! MuPDF's `fz_context` is not thread-safe, so every document is opened,
//! read and dropped while holding a single `parking_lot::Mutex`.

use std::path::Path;

use mupdf::Document;
use parking_lot::{Mutex, MutexGuard};

use super::reader::{PdfError, PdfPages, PdfResult, PdfTextReader};

/// PDF text reader using MuPDF
#[derive(Default)]
pub struct MupdfReader {
    lock: Mutex<()>,
}

impl MupdfReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PdfTextReader for MupdfReader {
    fn open<'a>(&'a self, path: &Path) -> PdfResult<Box<dyn PdfPages + 'a>> {
        // Held until the returned document is dropped
        let guard = self.lock.lock();

        let path_str = path.to_string_lossy();
        let doc = Document::open(&*path_str).map_err(|e| PdfError::Corrupt(e.to_string()))?;

        let page_count = doc
            .page_count()
            .map_err(|e| PdfError::Corrupt(e.to_string()))?;

        Ok(Box::new(MupdfPages {
            doc,
            page_count: page_count.max(0) as usize,
            _guard: guard,
        }))
    }
}

/// Open MuPDF document; fields drop in order, so the lock is released last
struct MupdfPages<'a> {
    doc: Document,
    page_count: usize,
    _guard: MutexGuard<'a, ()>,
}

impl PdfPages for MupdfPages<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, page: u32) -> PdfResult<Option<String>> {
        let to_error = |e: mupdf::Error| PdfError::PageText {
            page,
            message: e.to_string(),
        };

        let index = page.checked_sub(1).ok_or(PdfError::PageText {
            page,
            message: "page numbers start at 1".to_string(),
        })?;

        let loaded = self.doc.load_page(index as i32).map_err(to_error)?;
        let text = loaded.to_text().map_err(to_error)?;

        Ok(Some(text))
    }
}
