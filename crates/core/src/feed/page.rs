//! Page window and result page types.

use serde::Serialize;

use crate::model::FeedEntry;

/// A normalized page window. Construct through [`PageRequest::new`] so the
/// values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the metadata a client needs to navigate it.
///
/// `total` counts every record matching the search and filters, not just
/// the ones on this page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

/// A page of the public video feed.
pub type FeedPage = Page<FeedEntry>;

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let page = request.page();
        let page_size = request.page_size();
        let total_pages = total.div_ceil(page_size);
        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
        }
    }

    /// A page with no items, e.g. when the store holds nothing matching.
    pub fn empty(total: u64, request: PageRequest) -> Self {
        Self::new(Vec::new(), total, request)
    }
}
