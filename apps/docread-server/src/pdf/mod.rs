//! PDF text layer access
//!
//! [`PdfTextReader`] is the seam between the extraction dispatcher and the
//! PDF library. The production implementation is [`MupdfReader`]; tests
//! substitute in-memory readers.

mod mupdf_reader;
mod reader;

pub use mupdf_reader::MupdfReader;
pub use reader::{PdfError, PdfPages, PdfResult, PdfTextReader};
