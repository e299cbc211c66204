//! Item repository seam.

use async_trait::async_trait;

use stockroom_core::ItemId;
use stockroom_inventory::{Item, ItemDraft, ItemPatch};

use crate::error::StoreResult;
use crate::query::ItemQuery;

/// Persistence seam for the item catalog.
///
/// Callers validate drafts and patches before handing them over; stores
/// enforce the referential rules (the category must exist) and report
/// violations as typed errors.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch one item with its category name resolved.
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// List items matching `query`, in the query's ordering.
    async fn list(&self, query: &ItemQuery) -> StoreResult<Vec<Item>>;

    /// Create an item and return its server-assigned id.
    async fn create(&self, draft: &ItemDraft) -> StoreResult<ItemId>;

    /// Merge `patch` into an existing item. `NotFound` if the id is absent;
    /// an empty patch against an existing item is a no-op.
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> StoreResult<()>;

    /// Delete an item. `NotFound` if the id is absent, so a second delete of
    /// the same id errors.
    async fn delete(&self, id: ItemId) -> StoreResult<()>;
}
