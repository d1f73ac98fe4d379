//! Pagination
//!
//! Page/size clamping and page-count math shared by every list endpoint.

use serde::Serialize;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_PER_PAGE: u64 = 10;

/// A clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Clamps the raw page and size to at least one, substituting the
    /// defaults (page 1, size 10) for zero.
    #[must_use]
    pub const fn clamped(page: u64, per_page: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            per_page: if per_page == 0 {
                DEFAULT_PER_PAGE
            } else {
                per_page
            },
        }
    }

    #[must_use]
    pub const fn page(self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn per_page(self) -> u64 {
        self.per_page
    }

    /// Row offset for the underlying query.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(DEFAULT_PAGE, DEFAULT_PER_PAGE)
    }
}

/// One page of results with the list envelope counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub page: u64,
    #[serde(rename = "perPage")]
    pub per_page: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "totalItems")]
    pub total_items: u64,
}

impl<T> PageOf<T> {
    /// Builds a page, clamping the reported page number into the range
    /// of pages that actually exist. An empty result set still reports
    /// one (empty) page.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.per_page()).max(1);

        Self {
            items,
            page: request.page().min(total_pages),
            per_page: request.per_page(),
            total_pages,
            total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_and_size_fall_back_to_defaults() {
        let request = PageRequest::clamped(0, 0);

        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), 10);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::clamped(3, 25);

        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn total_pages_round_up() {
        let page = PageOf::new(vec![1, 2], PageRequest::clamped(1, 10), 21);

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 21);
    }

    #[test]
    fn empty_results_still_report_one_page() {
        let page: PageOf<u8> = PageOf::new(vec![], PageRequest::clamped(1, 10), 0);

        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn page_beyond_the_end_is_clamped() {
        let page: PageOf<u8> = PageOf::new(vec![], PageRequest::clamped(9, 10), 15);

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
    }
}
