//! Storage seams shared by the access-code and assessment services.

pub mod memory;

use serde::{Deserialize, Serialize};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// 1-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "PageRequest::default_page")]
    pub page: usize,
    #[serde(default = "PageRequest::default_limit")]
    pub limit: usize,
}

impl PageRequest {
    pub const MAX_LIMIT: usize = 500;

    fn default_page() -> usize {
        1
    }

    fn default_limit() -> usize {
        20
    }

    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    fn normalized(self) -> (usize, usize) {
        (self.page.max(1), self.limit.clamp(1, Self::MAX_LIMIT))
    }

    /// Slice an already-ordered collection into the requested page.
    pub fn paginate<T>(self, items: Vec<T>) -> Page<T> {
        let (page, limit) = self.normalized();
        let total = items.len();
        let items = items
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Page {
            items,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit),
            },
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::default_page(), Self::default_limit())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
