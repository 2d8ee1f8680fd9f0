use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(message: Option<String>, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// A validated pagination window.
///
/// Construct it through [`PageRequest::clamped`] so that every caller agrees on
/// the bounds: `page >= 1` and `1 <= page_size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn clamped(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// SQL LIMIT for this window
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// One page of a search result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    /// Number of matching rows before pagination
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<T>,
}

impl<T> PagedResponse<T> {
    /// `page` and `page_size` are echoed as the caller sent them.
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        Self {
            total,
            page,
            page_size,
            items,
        }
    }
}
