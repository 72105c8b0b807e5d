//! The pull protocol exposed to retrieval callers.

use async_trait::async_trait;

use lodestone_core::StoreResult;

/// Buffered pull cursor over a paginated metadata retrieval.
///
/// A cursor serves exactly one logical retrieval operation. Its buffer
/// and paging window are per-instance mutable state with no internal
/// synchronization; it must not be shared between concurrent callers.
#[async_trait]
pub trait MetadataCursor: Send {
    /// Item type delivered by this cursor.
    type Item: Send;

    /// Returns true when at least one more item can be delivered.
    ///
    /// May perform one or more blocking round-trips to the store when the
    /// buffer is empty. Once the buffer is non-empty, further calls
    /// return immediately without touching the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures; a failed cursor reports end-of-data on
    /// subsequent calls.
    async fn has_next(&mut self) -> StoreResult<bool>;

    /// Delivers the next item, or `Ok(None)` once the retrieval is
    /// exhausted. Plain end-of-data is absence, never an error.
    ///
    /// # Errors
    ///
    /// Propagates store failures encountered while refilling the buffer.
    async fn next(&mut self) -> StoreResult<Option<Self::Item>>;

    /// Pulls every remaining item into a vector.
    ///
    /// # Errors
    ///
    /// Propagates the first store failure; items pulled before the
    /// failure are dropped with the cursor.
    async fn drain(&mut self) -> StoreResult<Vec<Self::Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}
