//! Page-number pagination over ordered result sequences.
//!
//! Page numbers on the public surface are 1-based and clamped: asking for a
//! page past the end returns the last page, asking for page 0 returns the
//! first. No snapshot isolation is provided; two paginations of the same
//! query may differ if rows were inserted between calls.

use serde::Serialize;

/// A bounded-size slice of an ordered result sequence, with the metadata
/// needed to render page navigation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page (at most `page_size`).
    pub items: Vec<T>,
    /// The 1-based page number this slice came from.
    pub page: u64,
    /// System-wide page size.
    pub page_size: u64,
    /// Total items across all pages.
    pub total_items: u64,
    /// Total number of pages (0 when the sequence is empty).
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice and its query's totals.
    #[must_use]
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_pages(total_items, page_size);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Convert the item type, keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Total number of pages for a sequence of `total_items`.
#[must_use]
pub const fn total_pages(total_items: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Resolve a requested page number against the sequence's totals.
///
/// Returns the clamped 1-based page number and the zero-based fetch index.
/// A missing request defaults to page 1; out-of-range requests land on the
/// nearest valid page. An empty sequence resolves to page 1 of nothing.
#[must_use]
pub fn resolve_page(requested: Option<u64>, total_items: u64, page_size: u64) -> (u64, u64) {
    let last = total_pages(total_items, page_size).max(1);
    let page = requested.unwrap_or(1).clamp(1, last);
    (page, page - 1)
}
