//! Paging window validation and normalization.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A single page request: starting position and page size.
///
/// Constructed once per retrieval operation via
/// [`PageRequestPolicy::normalize`] and advanced only by the cursor that
/// owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingWindow {
    /// Starting position in the store's native ordering.
    pub offset: usize,
    /// Page size; always in `[1, max_page_size]`.
    pub limit: usize,
}

impl PagingWindow {
    /// Advances the starting position by `stride` items.
    pub fn advance_by(&mut self, stride: usize) {
        self.offset += stride;
    }
}

/// Validates and normalizes caller-supplied paging parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageRequestPolicy {
    max_page_size: usize,
}

impl PageRequestPolicy {
    /// System maximum page size, applied when the caller requests "no
    /// limit". The underlying store never returns unbounded batches, so
    /// this is a large fixed ceiling rather than "unbounded".
    pub const DEFAULT_MAX_PAGE_SIZE: usize = 500;

    /// Creates a policy with the given page-size ceiling.
    #[must_use]
    pub const fn new(max_page_size: usize) -> Self {
        Self { max_page_size }
    }

    /// Returns the page-size ceiling.
    #[must_use]
    pub const fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Validates `(offset, limit)` and produces a paging window.
    ///
    /// A `limit` of 0 means "use the system maximum"; limits above the
    /// ceiling are clamped to it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPagingParameter` when either value is
    /// negative. No store call is made on the failure path.
    pub fn normalize(&self, offset: i64, limit: i64) -> StoreResult<PagingWindow> {
        if offset < 0 {
            return Err(StoreError::invalid_paging(format!(
                "offset must be non-negative, got {offset}"
            )));
        }
        if limit < 0 {
            return Err(StoreError::invalid_paging(format!(
                "limit must be non-negative, got {limit}"
            )));
        }

        let limit = if limit == 0 {
            self.max_page_size
        } else {
            (limit as usize).min(self.max_page_size)
        };

        Ok(PagingWindow {
            offset: offset as usize,
            limit,
        })
    }
}

impl Default for PageRequestPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_PAGE_SIZE)
    }
}
