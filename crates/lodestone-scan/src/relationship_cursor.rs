//! Cursor over a property-searched relationship listing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use lodestone_core::{
    MetadataQueryPort, PagingWindow, Principal, Relationship, RelationshipQuery, StoreResult,
};

use crate::cursor::MetadataCursor;

/// Buffered cursor over a paged relationship search.
///
/// Relationship search results are not subject to the post-filter
/// attrition entity listings see, so a single empty page is a reliable
/// termination signal and there is no retry loop. The store may return
/// fewer items than requested on a non-final page; the window advances
/// by the actual batch length so the next fetch starts immediately
/// after a short page.
pub struct RelationshipCursor {
    port: Arc<dyn MetadataQueryPort>,
    principal: Principal,
    query: RelationshipQuery,
    window: PagingWindow,
    buffer: VecDeque<Relationship>,
    exhausted: bool,
}

impl RelationshipCursor {
    /// Creates a cursor at the given starting window.
    #[must_use]
    pub fn new(
        port: Arc<dyn MetadataQueryPort>,
        principal: Principal,
        query: RelationshipQuery,
        window: PagingWindow,
    ) -> Self {
        Self {
            port,
            principal,
            query,
            window,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Returns the window the next fetch would use.
    #[must_use]
    pub const fn window(&self) -> PagingWindow {
        self.window
    }
}

#[async_trait]
impl MetadataCursor for RelationshipCursor {
    type Item = Relationship;

    async fn has_next(&mut self) -> StoreResult<bool> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        if self.exhausted {
            return Ok(false);
        }

        let window = self.window;
        let batch = match self
            .port
            .find_relationships(&self.principal, &self.query, &window)
            .await
        {
            Ok(batch) => batch,
            Err(err) => {
                self.exhausted = true;
                return Err(err);
            }
        };

        match batch {
            Some(items) if !items.is_empty() => {
                // Advance by what actually came back, not the requested
                // limit; a short page positions the next fetch right
                // after its last item.
                self.window.advance_by(items.len());
                tracing::debug!(
                    offset = window.offset,
                    requested = window.limit,
                    count = items.len(),
                    "buffered relationship page"
                );
                self.buffer.extend(items);
                Ok(true)
            }
            _ => {
                self.exhausted = true;
                Ok(false)
            }
        }
    }

    async fn next(&mut self) -> StoreResult<Option<Relationship>> {
        if self.has_next().await? {
            Ok(self.buffer.pop_front())
        } else {
            Ok(None)
        }
    }
}
