//! Remote snippet store adapter.
//!
//! [`SnippetStore`] is the seam between the collection engine and the
//! persistent store. Every operation is scoped to the caller's owner id and
//! reports failures as [`StoreError`](crate::StoreError) only.

mod memory;
mod supabase;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{OwnerId, Snippet, SnippetId};
use crate::validation::{ValidatedPatch, ValidatedSnippet};

pub use memory::{MemorySnippetStore, StoreOp};
pub use supabase::SupabaseSnippetStore;

/// Storage operations for snippets owned by one user
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// List the owner's snippets, newest `created_at` first
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Snippet>>;

    /// Insert a snippet; the store assigns `id` and both timestamps
    async fn insert(&self, owner: &OwnerId, input: &ValidatedSnippet) -> StoreResult<Snippet>;

    /// Apply a partial update; `id`, owner and `created_at` never change
    async fn update_by_id(&self, owner: &OwnerId, patch: &ValidatedPatch) -> StoreResult<()>;

    /// Delete a snippet by id
    async fn delete_by_id(&self, owner: &OwnerId, id: &SnippetId) -> StoreResult<()>;
}
