//! Page selection sent with list requests and the pagination block returned with them.

use serde::{Deserialize, Serialize};

use crate::query::QueryParams;

/// Page selection for list endpoints.
///
/// Zero means "unset": the server default applies and no parameter is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    pub fn add_to(&self, query: &mut QueryParams) {
        if self.page != 0 {
            query.add("page", self.page);
        }
        if self.per_page != 0 {
            query.add("per_page", self.per_page);
        }
    }
}

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub total_entries: u64,
}

/// The `meta` object wrapping `PageMetadata`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedMetadata {
    pub pagination: PageMetadata,
}
