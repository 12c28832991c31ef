//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page index (0-based).
    #[serde(default)]
    pub page_index: u64,
    /// Number of items per page. Out-of-range values, e.g. from a
    /// deserialized request, are clamped by [`PageRequest::limit`].
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request. The page size is clamped to `1..=100`.
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(self.limit())
    }

    /// Return the SQL `LIMIT` value, always within `1..=100`.
    pub fn limit(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total number of matches.
///
/// `total_count` counts every match of the query, independent of the
/// page size, so a UI can render page controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedData<T> {
    /// The items on this page, in query order.
    pub results: Vec<T>,
    /// Total number of items across all pages.
    pub total_count: u64,
}

impl<T> PaginatedData<T> {
    /// Create a new page of results.
    pub fn new(results: Vec<T>, total_count: u64) -> Self {
        Self {
            results,
            total_count,
        }
    }

    /// Create an empty page.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Number of pages needed to show every match at the given page size.
    pub fn total_pages(&self, page_size: u64) -> u64 {
        if self.total_count == 0 {
            1
        } else {
            self.total_count.div_ceil(page_size.max(1))
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
