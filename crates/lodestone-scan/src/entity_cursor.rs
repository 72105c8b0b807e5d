//! Cursor over a type/status/classification-scoped entity listing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use lodestone_core::{
    Entity, EntityQuery, MetadataQueryPort, PagingWindow, Principal, ScanConfig, StoreError,
    StoreResult,
};

use crate::cursor::MetadataCursor;

/// Buffered cursor over a paged entity listing.
///
/// The store applies temporal, lineage, and duplicate filtering after
/// slicing a page out of its native ordering, so a page can come back
/// empty even though matching data exists further along. This cursor
/// therefore keeps fetching past empty pages, advancing the window by
/// the requested page size each time (fixed stride), until the store
/// either yields data or signals a true end-of-data. The number of
/// consecutive empty pages it tolerates is bounded; reaching the bound
/// surfaces a distinct inconclusive outcome instead of looping forever.
pub struct EntityCursor {
    port: Arc<dyn MetadataQueryPort>,
    principal: Principal,
    query: EntityQuery,
    window: PagingWindow,
    buffer: VecDeque<Entity>,
    exhausted: bool,
    retry_ceiling: usize,
}

impl EntityCursor {
    /// Creates a cursor with the default empty-page retry ceiling.
    #[must_use]
    pub fn new(
        port: Arc<dyn MetadataQueryPort>,
        principal: Principal,
        query: EntityQuery,
        window: PagingWindow,
    ) -> Self {
        Self {
            port,
            principal,
            query,
            window,
            buffer: VecDeque::new(),
            exhausted: false,
            retry_ceiling: ScanConfig::DEFAULT_EMPTY_PAGE_RETRY_CEILING,
        }
    }

    /// Overrides the number of consecutive empty, non-terminal pages
    /// tolerated before the retrieval is declared inconclusive.
    #[must_use]
    pub fn with_retry_ceiling(mut self, ceiling: usize) -> Self {
        self.retry_ceiling = ceiling;
        self
    }

    /// Returns the window the next fetch would use.
    #[must_use]
    pub const fn window(&self) -> PagingWindow {
        self.window
    }
}

#[async_trait]
impl MetadataCursor for EntityCursor {
    type Item = Entity;

    async fn has_next(&mut self) -> StoreResult<bool> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        if self.exhausted {
            return Ok(false);
        }

        let mut consecutive_empty = 0usize;
        loop {
            let window = self.window;
            let batch = match self
                .port
                .find_entities(&self.principal, &self.query, &window)
                .await
            {
                Ok(batch) => batch,
                Err(err) => {
                    self.exhausted = true;
                    return Err(err);
                }
            };

            // Fixed stride: the next window starts one full page further
            // along the store's native order, regardless of how many
            // items survived server-side filtering.
            self.window.advance_by(window.limit);

            match batch {
                None => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Some(items) if items.is_empty() => {
                    consecutive_empty += 1;
                    tracing::debug!(
                        offset = window.offset,
                        limit = window.limit,
                        consecutive_empty,
                        "entity page filtered empty, fetching next window"
                    );
                    if consecutive_empty >= self.retry_ceiling {
                        self.exhausted = true;
                        tracing::warn!(
                            attempts = consecutive_empty,
                            "empty-page retry ceiling reached, retrieval inconclusive"
                        );
                        return Err(StoreError::EmptyPageRetriesExhausted {
                            attempts: consecutive_empty,
                        });
                    }
                }
                Some(items) => {
                    tracing::debug!(
                        offset = window.offset,
                        count = items.len(),
                        "buffered entity page"
                    );
                    self.buffer.extend(items);
                    return Ok(true);
                }
            }
        }
    }

    async fn next(&mut self) -> StoreResult<Option<Entity>> {
        if self.has_next().await? {
            Ok(self.buffer.pop_front())
        } else {
            Ok(None)
        }
    }
}
