//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Hard cap on page size, regardless of what the client asks for.
pub const MAX_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Returns a copy with `per_page` clamped to [1, `MAX_PER_PAGE`] and
    /// `page` clamped to at least 1.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page.max(1)))).unwrap_or(u32::MAX)
        };

        Self {
            data,
            meta: PageMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 20, 0)]
    #[case(2, 20, 20)]
    #[case(3, 25, 50)]
    #[case(10, 100, 900)]
    fn test_offset(#[case] page: u32, #[case] per_page: u32, #[case] expected: u64) {
        let req = PageRequest { page, per_page };
        assert_eq!(req.offset(), expected);
        assert_eq!(req.limit(), u64::from(per_page));
    }

    #[test]
    fn test_clamped_caps_per_page() {
        let req = PageRequest {
            page: 0,
            per_page: 10_000,
        }
        .clamped();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp = PageResponse::new(vec![1, 2, 3], 1, 20, 41);
        assert_eq!(resp.meta.total_pages, 3);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let resp: PageResponse<u8> = PageResponse::new(vec![], 1, 20, 0);
        assert_eq!(resp.meta.total_pages, 1);
    }
}
