//! Page Selection Parser
//!
//! Parses user-supplied page selections into a sorted, deduplicated set of
//! page numbers. Pages are 1-based; an explicit 0 is kept so the selector can
//! report it as out of range instead of widening the selection.
//!
//! Grammar:
//! ```text
//! spec    = "ALL" | segment ("," segment)*
//! segment = number | number "-" number
//! number  = digit+
//! ```
//!
//! Parsing never fails. A segment that does not match the grammar is dropped
//! with a warning, and a selection left without any page falls back to
//! [`NormalizedPageSet::All`].

use std::fmt;
use std::ops::RangeInclusive;

use serde::Deserialize;
use thiserror::Error;

/// Sentinel selecting every page
const ALL: &str = "ALL";

/// Upper bound on the number of pages one selection can name
const MAX_SELECTED_PAGES: usize = 100_000;

/// Raw page selection as sent by clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageSpec {
    /// Delimited string, e.g. `"1-3,5"` or `"ALL"`
    Text(String),
    /// Mixed list, e.g. `[1, "3", 5]`
    Atoms(Vec<PageAtom>),
    /// Any other JSON value
    Other(serde_json::Value),
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::Text(ALL.to_string())
    }
}

impl From<&str> for PageSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<PageAtom>> for PageSpec {
    fn from(atoms: Vec<PageAtom>) -> Self {
        Self::Atoms(atoms)
    }
}

/// Single entry of a list-style selection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PageAtom {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl From<i64> for PageAtom {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PageAtom {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Parser output: every page, or an ascending list of unique page numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedPageSet {
    All,
    Pages(Vec<u32>),
}

impl NormalizedPageSet {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether `page` is part of the selection
    pub fn contains(&self, page: u32) -> bool {
        match self {
            Self::All => true,
            Self::Pages(pages) => pages.binary_search(&page).is_ok(),
        }
    }
}

impl fmt::Display for NormalizedPageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Pages(pages) => {
                for (i, page) in pages.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", page)?;
                }
                Ok(())
            }
        }
    }
}

/// Reasons a segment is dropped from a selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum SegmentError {
    #[error("invalid range {start}-{end}: start is greater than end")]
    InvertedRange { start: u32, end: u32 },

    #[error("not a page number or range")]
    Malformed,
}

/// Parse a page selection
///
/// Invalid tokens are dropped with a warning. The result is never an empty
/// page list: a selection without any valid page yields
/// [`NormalizedPageSet::All`].
pub fn parse(spec: &PageSpec) -> NormalizedPageSet {
    match spec {
        PageSpec::Text(text) => parse_text(text),
        PageSpec::Atoms(atoms) => parse_atoms(atoms),
        PageSpec::Other(serde_json::Value::Null) => NormalizedPageSet::All,
        PageSpec::Other(value) => {
            tracing::warn!("Unsupported page selection {}, using all pages", value);
            NormalizedPageSet::All
        }
    }
}

fn parse_text(text: &str) -> NormalizedPageSet {
    let text = text.trim();
    if text.eq_ignore_ascii_case(ALL) {
        return NormalizedPageSet::All;
    }

    let mut pages = PageCollector::new();
    for segment in text.split(',').map(str::trim) {
        if pages.is_full() {
            break;
        }
        if segment.is_empty() {
            continue;
        }
        match parse_segment(segment) {
            Ok(range) => pages.insert_range(range),
            Err(e) => {
                tracing::warn!("Ignoring page selection segment '{}': {}", segment, e);
                pages.rejected += 1;
            }
        }
    }

    pages.finish()
}

fn parse_atoms(atoms: &[PageAtom]) -> NormalizedPageSet {
    let mut pages = PageCollector::new();

    for atom in atoms {
        if pages.is_full() {
            break;
        }
        let page = match atom {
            PageAtom::Number(n) => u32::try_from(*n).ok(),
            PageAtom::Text(s) => parse_number(s).ok(),
            PageAtom::Other(_) => None,
        };
        match page {
            Some(page) => pages.insert_range(page..=page),
            None => {
                tracing::warn!("Ignoring page selection entry {:?}", atom);
                pages.rejected += 1;
            }
        }
    }

    pages.finish()
}

/// Parse one comma-separated segment into the inclusive range it names
///
/// Page 0 is kept; it never matches a document page, so the selector
/// reports it as out of range.
fn parse_segment(segment: &str) -> Result<RangeInclusive<u32>, SegmentError> {
    let Some((start, end)) = segment.split_once('-') else {
        let page = parse_number(segment)?;
        return Ok(page..=page);
    };

    // "1-2-3" leaves a hyphen in `end`, which parse_number rejects
    let start = parse_number(start.trim())?;
    let end = parse_number(end.trim())?;

    if start > end {
        return Err(SegmentError::InvertedRange { start, end });
    }

    Ok(start..=end)
}

/// Parse a non-empty run of ASCII digits
fn parse_number(s: &str) -> Result<u32, SegmentError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SegmentError::Malformed);
    }
    s.parse().map_err(|_| SegmentError::Malformed)
}

/// Ranges collected before they are merged
const COMPACT_THRESHOLD: usize = 1024;

/// Accumulates ranges without expanding them
///
/// Ranges are sorted and merged whenever the list doubles, so the work per
/// segment stays logarithmic however much the segments overlap. Pages are
/// only expanded once, in [`PageCollector::finish`], and never beyond
/// [`MAX_SELECTED_PAGES`].
struct PageCollector {
    ranges: Vec<RangeInclusive<u32>>,
    compact_at: usize,
    rejected: usize,
    full: bool,
}

impl PageCollector {
    fn new() -> Self {
        Self {
            ranges: Vec::new(),
            compact_at: COMPACT_THRESHOLD,
            rejected: 0,
            full: false,
        }
    }

    fn insert_range(&mut self, range: RangeInclusive<u32>) {
        self.ranges.push(range);
        if self.ranges.len() >= self.compact_at {
            self.compact();
            self.compact_at = (self.ranges.len() * 2).max(COMPACT_THRESHOLD);
        }
    }

    /// Whether the merged ranges already cover the page limit
    fn is_full(&self) -> bool {
        self.full
    }

    /// Sort and merge overlapping or adjacent ranges
    fn compact(&mut self) {
        self.ranges.sort_unstable_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if u64::from(*range.start()) <= u64::from(*last.end()) + 1 => {
                    if range.end() > last.end() {
                        *last = *last.start()..=*range.end();
                    }
                }
                _ => merged.push(range),
            }
        }
        self.ranges = merged;

        if self.covered() >= MAX_SELECTED_PAGES as u64 && !self.full {
            tracing::warn!(
                "Page selection exceeds {} pages, ignoring the rest",
                MAX_SELECTED_PAGES
            );
            self.full = true;
        }
    }

    /// Number of pages in the merged ranges
    fn covered(&self) -> u64 {
        self.ranges
            .iter()
            .map(|r| u64::from(*r.end()) - u64::from(*r.start()) + 1)
            .sum()
    }

    fn finish(mut self) -> NormalizedPageSet {
        self.compact();

        if self.ranges.is_empty() {
            if self.rejected > 0 {
                tracing::warn!(
                    "No valid pages in selection ({} entries rejected), using all pages",
                    self.rejected
                );
            }
            return NormalizedPageSet::All;
        }

        let pages = self
            .ranges
            .into_iter()
            .flatten()
            .take(MAX_SELECTED_PAGES)
            .collect();
        NormalizedPageSet::Pages(pages)
    }
}
