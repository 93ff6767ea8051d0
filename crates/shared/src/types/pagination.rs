//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Returns the limit clamped to [1, `MAX_PAGE_SIZE`].
    #[must_use]
    pub fn clamped_limit(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
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
    /// Requested limit after clamping.
    pub limit: u64,
    /// Requested offset.
    pub offset: u64,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta {
                limit: request.clamped_limit(),
                offset: request.offset,
                total,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request() {
        let request = PageRequest::default();
        assert_eq!(request.limit, 20);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_limit_clamped_to_max() {
        let request = PageRequest {
            limit: 10_000,
            offset: 0,
        };
        assert_eq!(request.clamped_limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_limit_clamped_to_min() {
        let request = PageRequest {
            limit: 0,
            offset: 0,
        };
        assert_eq!(request.clamped_limit(), 1);
    }

    #[test]
    fn test_response_meta() {
        let response = PageResponse::new(vec![1, 2, 3], PageRequest::default(), 42);
        assert_eq!(response.meta.limit, 20);
        assert_eq!(response.meta.total, 42);
        assert_eq!(response.data.len(), 3);
    }
}
