//! Page Selector
//!
//! Clips a normalized selection to the pages a document actually has.

use super::parser::NormalizedPageSet;

/// Page numbers to extract, each within `1..=total_pages`
///
/// An empty selection means none of the requested pages exist in the
/// document. It is distinct from [`NormalizedPageSet::All`] on an empty
/// document only in how the caller reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedPages(Vec<u32>);

impl SelectedPages {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

/// Select the in-range pages of `normalized` for a document of `total_pages`
pub fn select(normalized: &NormalizedPageSet, total_pages: usize) -> SelectedPages {
    let total = u32::try_from(total_pages).unwrap_or(u32::MAX);

    match normalized {
        NormalizedPageSet::All => SelectedPages((1..=total).collect()),
        NormalizedPageSet::Pages(pages) => {
            let selected: Vec<u32> = pages
                .iter()
                .copied()
                .filter(|p| (1..=total).contains(p))
                .collect();

            if selected.len() < pages.len() {
                tracing::warn!(
                    "Dropped {} requested page(s) outside 1..={}",
                    pages.len() - selected.len(),
                    total
                );
            }

            SelectedPages(selected)
        }
    }
}
