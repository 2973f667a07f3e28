//! Domain operations. Every function runs inside a caller-provided
//! [`Session`](crate::store::Session), checks the caller's rights first and
//! returns a typed error without partial effects.

pub mod buckets;
pub mod labels;
pub mod link_shares;
pub mod lists;
pub mod namespaces;
pub mod repeat;
pub mod sharing;
pub mod tasks;
pub mod teams;
pub mod users;

use serde::Deserialize;

/// Query parameters accepted by every listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Search term.
    pub s: String,
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Clamps the request to `max_per_page` items and turns it into a window.
    #[must_use]
    pub fn window(&self, max_per_page: i64) -> Window {
        let limit = if self.per_page <= 0 || self.per_page > max_per_page {
            max_per_page
        } else {
            self.per_page
        };
        let page = self.page.max(1);
        Window {
            search: self.s.clone(),
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

/// A search term plus the slice of results to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub search: String,
    pub limit: i64,
    pub offset: i64,
}

impl Window {
    /// No search, no limit.
    #[must_use]
    pub fn all() -> Self {
        Self {
            search: String::new(),
            limit: -1,
            offset: 0,
        }
    }
}

/// One page of results with the total count behind it.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
}

impl<T> Paged<T> {
    #[must_use]
    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            return 1;
        }
        (self.total + self.limit - 1) / self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_to_max_per_page() {
        let window = PageRequest::default().window(50);
        assert_eq!(window.limit, 50);
        assert_eq!(window.offset, 0);
    }

    #[test]
    fn test_window_clamps_and_offsets() {
        let request = PageRequest {
            s: "milk".into(),
            page: 3,
            per_page: 500,
        };
        let window = request.window(50);
        assert_eq!(window.limit, 50);
        assert_eq!(window.offset, 100);
        assert_eq!(window.search, "milk");

        let request = PageRequest {
            page: 2,
            per_page: 10,
            ..Default::default()
        };
        assert_eq!(request.window(50).offset, 10);
    }

    #[test]
    fn test_window_huge_page_does_not_wrap() {
        let request = PageRequest {
            page: i64::MAX,
            per_page: 50,
            ..Default::default()
        };
        let window = request.window(50);
        assert_eq!(window.limit, 50);
        assert_eq!(window.offset, i64::MAX);
    }

    #[test]
    fn test_total_pages() {
        let paged = Paged::<()> {
            items: vec![],
            total: 21,
            limit: 10,
        };
        assert_eq!(paged.total_pages(), 3);

        let empty = Paged::<()> {
            items: vec![],
            total: 0,
            limit: 10,
        };
        assert_eq!(empty.total_pages(), 0);
    }
}
