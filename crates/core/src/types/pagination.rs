//! Page metadata returned with every product list.

use serde::{Deserialize, Serialize};

/// Position within the paged product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub has_pre: bool,
    #[serde(default)]
    pub has_next: bool,
    /// Category filter the page was fetched with (empty for none).
    #[serde(default)]
    pub category: String,
}

const fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_pages: 0,
            current_page: first_page(),
            has_pre: false,
            has_next: false,
            category: String::new(),
        }
    }
}

impl Pagination {
    /// Whether `page` is a real page of this listing.
    #[must_use]
    pub const fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// The following page, if there is one.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.has_next {
            Some(self.current_page + 1)
        } else {
            None
        }
    }

    /// The preceding page, if there is one.
    #[must_use]
    pub const fn previous_page(&self) -> Option<u32> {
        if self.has_pre && self.current_page > 1 {
            Some(self.current_page - 1)
        } else {
            None
        }
    }
}
