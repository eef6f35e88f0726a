//! Page selection
//!
//! Converts the `pages` field of a request into the page numbers that are
//! actually extracted from a document.
//!
//! ```text
//! PageSpec ──parse──▶ NormalizedPageSet ──select(total_pages)──▶ SelectedPages
//! ```

mod parser;
mod selector;

pub use parser::{parse, NormalizedPageSet, PageAtom, PageSpec};
pub use selector::{select, SelectedPages};
