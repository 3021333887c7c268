//! The OCR adapter seam: the core only consumes [`RawFragment`]
//! records, so host applications plug in a real OCR/layout engine
//! through this trait without the core depending on one — mirroring the
//! pluggable-strategy shape used elsewhere in this crate's pipeline.

use crate::error::Result;
use crate::model::RawFragment;

/// Produces [`RawFragment`]s for one page of a document. Implementors
/// are expected to be cheap to share across threads (one document per
/// thread in batch mode), hence `Send + Sync`.
pub trait OcrAdapter: Send + Sync {
    /// Return the recognized fragments for `page` (1-based), or an
    /// error if the page could not be recognized.
    fn fragments_for_page(&self, page: u32) -> Result<Vec<RawFragment>>;

    /// Total page count, when known ahead of time.
    fn page_count(&self) -> Option<u32> {
        None
    }
}

/// A pre-built, in-memory adapter: wraps a `Vec<RawFragment>` grouped by
/// page. Used by tests and the demonstration binary; this is not a real
/// OCR engine and is not meant to become one.
#[derive(Debug, Clone, Default)]
pub struct StaticAdapter {
    fragments_by_page: std::collections::HashMap<u32, Vec<RawFragment>>,
    page_count: Option<u32>,
}

impl StaticAdapter {
    /// Build an adapter from a flat fragment list, grouping by
    /// `fragment.page`.
    pub fn new(fragments: Vec<RawFragment>) -> Self {
        let mut by_page: std::collections::HashMap<u32, Vec<RawFragment>> = std::collections::HashMap::new();
        let page_count = fragments.iter().map(|f| f.page).max();
        for fragment in fragments {
            by_page.entry(fragment.page).or_default().push(fragment);
        }
        Self {
            fragments_by_page: by_page,
            page_count,
        }
    }
}

impl OcrAdapter for StaticAdapter {
    fn fragments_for_page(&self, page: u32) -> Result<Vec<RawFragment>> {
        Ok(self.fragments_by_page.get(&page).cloned().unwrap_or_default())
    }

    fn page_count(&self) -> Option<u32> {
        self.page_count
    }
}
