//! Page/size pagination primitives shared by contactbook list endpoints.
//!
//! List endpoints accept an optional `page` (1-based) and `size` query pair,
//! run a windowed query plus a total-count query, and answer with a
//! [`Paging`] block alongside the items:
//!
//! ```
//! use pagination::{PageRequest, Paging};
//!
//! let request = PageRequest::from_query(Some(2), Some(10)).expect("valid page");
//! assert_eq!(request.offset(), 10);
//!
//! let paging = Paging::new(request, 25);
//! assert_eq!(paging.total_page, 3);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page number used when the caller omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller omits `size`.
pub const DEFAULT_SIZE: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_SIZE: u32 = 100;

/// Validation failures raised when building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are 1-based.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// Size must fall within `1..=MAX_SIZE`.
    #[error("size must be between 1 and {max}")]
    SizeOutOfRange {
        /// Upper bound accepted for `size`.
        max: u32,
    },
}

/// Validated page window requested by a caller.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= size <= MAX_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Validate an explicit page window.
    pub fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if size == 0 || size > MAX_SIZE {
            return Err(PageRequestError::SizeOutOfRange { max: MAX_SIZE });
        }
        Ok(Self { page, size })
    }

    /// Build a window from optional query parameters, filling defaults.
    pub fn from_query(page: Option<u32>, size: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(DEFAULT_PAGE), size.unwrap_or(DEFAULT_SIZE))
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip before the window starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    /// Maximum number of rows in the window.
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
        }
    }
}

/// Paging metadata returned with every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Requested 1-based page.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Total number of items matching the filters.
    pub total_item: u64,
    /// `ceil(total_item / size)`.
    pub total_page: u64,
}

impl Paging {
    /// Derive paging metadata for a request and the matching item count.
    pub fn new(request: PageRequest, total_item: u64) -> Self {
        Self {
            page: request.page,
            size: request.size,
            total_item,
            total_page: total_item.div_ceil(u64::from(request.size)),
        }
    }
}

/// One page of items plus its paging metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items inside the requested window.
    pub items: Vec<T>,
    /// Metadata describing the window.
    pub paging: Paging,
}

impl<T> Page<T> {
    /// Assemble a page from loaded items and the total match count.
    pub fn new(items: Vec<T>, request: PageRequest, total_item: u64) -> Self {
        Self {
            items,
            paging: Paging::new(request, total_item),
        }
    }

    /// Transform every item while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            paging: self.paging,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page window validation and paging math.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_query_is_empty() {
        let request = PageRequest::from_query(None, None).expect("defaults are valid");
        assert_eq!(request.page(), 1);
        assert_eq!(request.size(), 10);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case(0, 10, PageRequestError::PageOutOfRange)]
    #[case(1, 0, PageRequestError::SizeOutOfRange { max: MAX_SIZE })]
    #[case(1, 101, PageRequestError::SizeOutOfRange { max: MAX_SIZE })]
    fn rejects_out_of_range_windows(
        #[case] page: u32,
        #[case] size: u32,
        #[case] expected: PageRequestError,
    ) {
        assert_eq!(PageRequest::new(page, size), Err(expected));
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 10, 3)]
    #[case(100, 100, 1)]
    #[case(101, 100, 2)]
    #[case(7, 1, 7)]
    fn total_page_is_ceiling_of_items_over_size(
        #[case] total_item: u64,
        #[case] size: u32,
        #[case] expected: u64,
    ) {
        let request = PageRequest::new(1, size).expect("valid window");
        assert_eq!(Paging::new(request, total_item).total_page, expected);
    }

    #[rstest]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(3, 20).expect("valid window");
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[rstest]
    fn paging_serialises_with_snake_case_keys() {
        let paging = Paging::new(PageRequest::default(), 11);
        let value = serde_json::to_value(paging).expect("serialise paging");
        assert_eq!(
            value,
            serde_json::json!({"page": 1, "size": 10, "total_item": 11, "total_page": 2})
        );
    }

    #[rstest]
    fn map_preserves_paging() {
        let page = Page::new(vec![1, 2], PageRequest::default(), 2);
        let mapped = page.map(|item| item * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.paging.total_item, 2);
    }
}
