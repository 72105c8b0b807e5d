//! The store-access capability consumed by the retrieval cursors.

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::StoreResult;
use crate::ids::Principal;
use crate::paging::PagingWindow;
use crate::query::{EntityQuery, RelationshipQuery};
use crate::relationship::Relationship;

/// Page-oriented query capability over the remote metadata store.
///
/// Each call is a stateless request carrying its own window; no
/// store-side resource is held open between calls. The return value
/// distinguishes three outcomes:
///
/// - `Ok(Some(batch))` with items: matching data for this window;
/// - `Ok(Some(vec![]))`: this window's slice, after server-side
///   filtering, contained no matching items, but the store has NOT
///   signaled end-of-data; more matching data may exist further along;
/// - `Ok(None)`: terminal, the store's underlying cursor is truly past
///   its end.
#[async_trait]
pub trait MetadataQueryPort: Send + Sync {
    /// Fetches one page of a type/status/classification-scoped entity
    /// listing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthorized` when the principal lacks read
    /// rights, or `StoreError::Server` for transport/internal failures.
    async fn find_entities(
        &self,
        principal: &Principal,
        query: &EntityQuery,
        window: &PagingWindow,
    ) -> StoreResult<Option<Vec<Entity>>>;

    /// Fetches one page of a property-searched relationship listing.
    ///
    /// A non-final page may legitimately contain fewer items than
    /// `window.limit`; callers must advance by the actual batch length.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthorized` when the principal lacks read
    /// rights, or `StoreError::Server` for transport/internal failures.
    async fn find_relationships(
        &self,
        principal: &Principal,
        query: &RelationshipQuery,
        window: &PagingWindow,
    ) -> StoreResult<Option<Vec<Relationship>>>;
}
