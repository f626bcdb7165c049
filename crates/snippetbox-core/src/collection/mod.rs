//! Session-scoped snippet collection.
//!
//! [`SnippetCollection`] owns the in-memory copy of the signed-in user's
//! snippets and is the only thing that mutates it. Mutations go to the store
//! first and are applied locally only once the store confirms them; nothing
//! is inserted optimistically.
//!
//! The state lock is never held across a store call, so overlapping
//! operations interleave at their network round trips. Each completion
//! re-checks that its session is still current and that its target id is
//! still present before touching the collection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result, StoreError};
use crate::facets::{category_options, derive_categories, derive_languages, language_options};
use crate::filter::{visible_snippets, FilterState};
use crate::models::{OwnerId, Snippet, SnippetId};
use crate::state::{CollectionStats, EditorState, Notice, SnippetView, ViewStatus};
use crate::store::SnippetStore;
use crate::validation::{validate_create, validate_update, FieldErrors, SnippetDraft, SnippetPatch};

const SAVE_FAILED: &str = "Failed to save snippet. Please try again.";
const DELETE_FAILED: &str = "Failed to delete snippet. Please try again.";
const LOAD_FAILED: &str = "Failed to load snippets. Please try again.";
const SIGNED_OUT: &str = "You must be logged in to manage snippets.";

/// Mutations confirmed while a load is in flight.
///
/// The list reply may predate them, so they are replayed onto the rows
/// before the load replaces the collection.
#[derive(Debug, Default)]
struct LoadJournal {
    created: Vec<Snippet>,
    updated: HashMap<SnippetId, Snippet>,
    removed: HashSet<SnippetId>,
}

impl LoadJournal {
    fn record_created(&mut self, snippet: &Snippet) {
        self.removed.remove(&snippet.id);
        self.created.push(snippet.clone());
    }

    fn record_updated(&mut self, snippet: &Snippet) {
        self.updated.insert(snippet.id, snippet.clone());
    }

    fn record_removed(&mut self, id: SnippetId) {
        self.created.retain(|snippet| snippet.id != id);
        self.updated.remove(&id);
        self.removed.insert(id);
    }

    fn replay(self, mut rows: Vec<Snippet>) -> Vec<Snippet> {
        for snippet in self.created {
            if !rows.iter().any(|row| row.id == snippet.id) {
                rows.insert(0, snippet);
            }
        }
        rows.retain(|row| !self.removed.contains(&row.id));
        for row in &mut rows {
            if let Some(updated) = self.updated.get(&row.id) {
                row.clone_from(updated);
            }
        }
        rows
    }
}

#[derive(Debug, Default)]
struct CollectionState {
    owner: Option<OwnerId>,
    /// Bumped on every session change; completions from older sessions are dropped.
    session_generation: u64,
    /// Bumped on every load; only the latest load applies its result.
    load_sequence: u64,
    snippets: Vec<Snippet>,
    loading: bool,
    load_failed: bool,
    filter: FilterState,
    field_errors: FieldErrors,
    notice: Option<Notice>,
    editor: EditorState,
    /// Reset at the start of every load.
    journal: LoadJournal,
}

impl CollectionState {
    fn position(&self, id: &SnippetId) -> Option<usize> {
        self.snippets.iter().position(|snippet| &snippet.id == id)
    }

    fn close_editor_for(&mut self, id: &SnippetId) {
        if self.editor == EditorState::Editing(*id) {
            self.editor = EditorState::Closed;
        }
    }

    fn debug_check_unique(&self) {
        debug_assert!(
            has_unique_ids(&self.snippets),
            "snippet collection holds duplicate ids"
        );
    }
}

/// The signed-in user's snippets plus filter and form state.
pub struct SnippetCollection<S> {
    store: Arc<S>,
    state: Arc<Mutex<CollectionState>>,
}

impl<S> Clone for SnippetCollection<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: SnippetStore> SnippetCollection<S> {
    /// Create an empty, signed-out collection backed by `store`.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            state: Arc::new(Mutex::new(CollectionState::default())),
        }
    }

    /// The store this collection persists through.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switch the session owner.
    ///
    /// Signing in (or switching user) rebuilds the collection from the store;
    /// signing out clears it. Setting the current owner again is a no-op.
    pub async fn set_session(&self, owner: Option<OwnerId>) -> Result<()> {
        {
            let mut state = self.lock().await;
            if state.owner == owner {
                return Ok(());
            }
            let filter = std::mem::take(&mut state.filter);
            let generation = state.session_generation + 1;
            let load_sequence = state.load_sequence;
            *state = CollectionState {
                owner: owner.clone(),
                session_generation: generation,
                load_sequence,
                filter,
                ..CollectionState::default()
            };
            tracing::info!(
                owner = owner.as_ref().map_or("-", OwnerId::as_str),
                "Session changed"
            );
        }

        if owner.is_some() {
            self.load().await
        } else {
            Ok(())
        }
    }

    /// Current session owner, if signed in.
    pub async fn owner(&self) -> Option<OwnerId> {
        self.lock().await.owner.clone()
    }

    /// Replace the collection with the owner's snippets from the store.
    ///
    /// Without a session this is a no-op. On failure the previous contents are
    /// kept and the view reports a retryable load error.
    pub async fn load(&self) -> Result<()> {
        let (owner, generation, sequence) = {
            let mut state = self.lock().await;
            let Some(owner) = state.owner.clone() else {
                state.loading = false;
                return Ok(());
            };
            state.load_sequence += 1;
            state.loading = true;
            state.journal = LoadJournal::default();
            (owner, state.session_generation, state.load_sequence)
        };

        tracing::debug!(owner = %owner, "Loading snippets");
        let result = self.store.list_by_owner(&owner).await;

        let mut state = self.lock().await;
        if state.session_generation != generation || state.load_sequence != sequence {
            tracing::debug!(owner = %owner, "Ignoring superseded load result");
            return result.map(|_| ()).map_err(Error::from);
        }
        state.loading = false;
        let journal = std::mem::take(&mut state.journal);

        match result {
            Ok(rows) => {
                state.snippets = journal.replay(owned_unique(rows, &owner));
                state.load_failed = false;
                if let EditorState::Editing(id) = state.editor {
                    if state.position(&id).is_none() {
                        state.editor = EditorState::Closed;
                    }
                }
                state.debug_check_unique();
                tracing::info!(owner = %owner, count = state.snippets.len(), "Snippets loaded");
                Ok(())
            }
            Err(error) => {
                state.load_failed = true;
                state.notice = Some(Notice::error(LOAD_FAILED));
                tracing::warn!(owner = %owner, "Failed to load snippets: {}", error);
                Err(error.into())
            }
        }
    }

    /// Validate `draft` and insert it; the new snippet goes to the front.
    pub async fn create(&self, draft: &SnippetDraft) -> Result<Snippet> {
        let validated = match validate_create(draft) {
            Ok(validated) => validated,
            Err(errors) => return Err(self.reject(errors).await),
        };
        let (owner, generation) = self.begin_mutation().await?;

        let result = self.store.insert(&owner, &validated).await;

        let mut state = self.lock().await;
        if state.session_generation != generation {
            tracing::debug!("Ignoring create completion from a previous session");
            return result.map_err(Error::from);
        }

        let snippet = match result {
            Ok(snippet) if snippet.owner_id == owner => snippet,
            Ok(snippet) => {
                tracing::warn!(snippet_id = %snippet.id, "Store returned a snippet for another owner");
                state.notice = Some(Notice::error(SAVE_FAILED));
                return Err(StoreError::Unknown("Inserted snippet has a foreign owner".to_string()).into());
            }
            Err(error) => {
                tracing::warn!("Failed to create snippet: {}", error);
                state.notice = Some(Notice::error(SAVE_FAILED));
                return Err(error.into());
            }
        };

        if let Some(index) = state.position(&snippet.id) {
            state.snippets.remove(index);
        }
        state.snippets.insert(0, snippet.clone());
        state.debug_check_unique();
        if state.loading {
            state.journal.record_created(&snippet);
        }
        if state.editor == EditorState::Creating {
            state.editor = EditorState::Closed;
        }
        state.notice = Some(Notice::success(
            "Snippet created",
            "Your new code snippet has been saved.",
        ));
        tracing::info!(snippet_id = %snippet.id, "Snippet created");
        Ok(snippet)
    }

    /// Validate `patch` and apply it to the snippet `id`.
    ///
    /// The local entry is patched only after the store confirms, and only if
    /// it is still in the collection by then.
    pub async fn update(&self, id: SnippetId, patch: &SnippetPatch) -> Result<()> {
        let validated = match validate_update(&id.as_str(), patch) {
            Ok(validated) => validated,
            Err(errors) => return Err(self.reject(errors).await),
        };
        let (owner, generation) = self.begin_mutation().await?;

        let result = self.store.update_by_id(&owner, &validated).await;

        let mut state = self.lock().await;
        if state.session_generation != generation {
            tracing::debug!(snippet_id = %id, "Ignoring update completion from a previous session");
            return result.map_err(Error::from);
        }

        if let Err(error) = result {
            tracing::warn!(snippet_id = %id, "Failed to update snippet: {}", error);
            state.notice = Some(Notice::error(SAVE_FAILED));
            return Err(error.into());
        }

        match state.position(&id) {
            Some(index) => {
                let entry = &mut state.snippets[index];
                validated.apply_to(entry);
                // Display approximation; the store's timestamp is authoritative.
                entry.updated_at = Utc::now().max(entry.created_at);
                let patched = entry.clone();
                if state.loading {
                    state.journal.record_updated(&patched);
                }
                tracing::info!(snippet_id = %id, "Snippet updated");
            }
            None => {
                tracing::warn!(snippet_id = %id, "Update confirmed for a snippet no longer in the collection");
            }
        }
        state.close_editor_for(&id);
        state.notice = Some(Notice::success(
            "Snippet updated",
            "Your code snippet has been updated successfully.",
        ));
        Ok(())
    }

    /// Delete the snippet `id` from the store, then from the collection.
    pub async fn remove(&self, id: SnippetId) -> Result<()> {
        let (owner, generation) = self.begin_mutation().await?;

        let result = self.store.delete_by_id(&owner, &id).await;

        let mut state = self.lock().await;
        if state.session_generation != generation {
            tracing::debug!(snippet_id = %id, "Ignoring delete completion from a previous session");
            return result.map_err(Error::from);
        }

        if let Err(error) = result {
            tracing::warn!(snippet_id = %id, "Failed to delete snippet: {}", error);
            state.notice = Some(Notice::error(DELETE_FAILED));
            return Err(error.into());
        }

        state.snippets.retain(|snippet| snippet.id != id);
        if state.loading {
            state.journal.record_removed(id);
        }
        state.close_editor_for(&id);
        state.notice = Some(Notice::success(
            "Snippet deleted",
            "The code snippet has been removed.",
        ));
        tracing::info!(snippet_id = %id, "Snippet deleted");
        Ok(())
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.lock().await.filter.search_term = term.into();
    }

    pub async fn select_language(&self, value: impl Into<String>) {
        self.lock().await.filter.selected_language = value.into();
    }

    pub async fn select_category(&self, value: impl Into<String>) {
        self.lock().await.filter.selected_category = value.into();
    }

    pub async fn reset_filters(&self) {
        self.lock().await.filter = FilterState::default();
    }

    /// Open the form for a new snippet.
    pub async fn open_new(&self) {
        let mut state = self.lock().await;
        state.editor = EditorState::Creating;
        state.field_errors = FieldErrors::default();
    }

    /// Open the form for `id`, returning the snippet to prefill it with.
    pub async fn open_edit(&self, id: SnippetId) -> Option<Snippet> {
        let mut state = self.lock().await;
        let snippet = state.position(&id).map(|index| state.snippets[index].clone())?;
        state.editor = EditorState::Editing(id);
        state.field_errors = FieldErrors::default();
        Some(snippet)
    }

    pub async fn close_editor(&self) {
        let mut state = self.lock().await;
        state.editor = EditorState::Closed;
        state.field_errors = FieldErrors::default();
    }

    pub async fn dismiss_notice(&self) {
        self.lock().await.notice = None;
    }

    /// Look up a snippet in the collection.
    pub async fn get(&self, id: SnippetId) -> Option<Snippet> {
        let state = self.lock().await;
        state.position(&id).map(|index| state.snippets[index].clone())
    }

    /// The whole collection, newest first.
    pub async fn snippets(&self) -> Vec<Snippet> {
        self.lock().await.snippets.clone()
    }

    /// Snippets passing the current filter, in collection order.
    pub async fn visible(&self) -> Vec<Snippet> {
        let state = self.lock().await;
        visible_snippets(&state.snippets, &state.filter)
    }

    pub async fn languages(&self) -> Vec<String> {
        derive_languages(&self.lock().await.snippets)
    }

    pub async fn categories(&self) -> Vec<String> {
        derive_categories(&self.lock().await.snippets)
    }

    pub async fn loading(&self) -> bool {
        self.lock().await.loading
    }

    /// Snapshot of everything a presentation layer renders.
    pub async fn view(&self) -> SnippetView {
        let state = self.lock().await;
        let visible = visible_snippets(&state.snippets, &state.filter);
        let languages = language_options(&state.snippets);
        let categories = category_options(&state.snippets);

        let status = if state.loading {
            ViewStatus::Loading
        } else if state.load_failed {
            ViewStatus::LoadFailed
        } else if visible.is_empty() {
            ViewStatus::Empty {
                filtered: state.filter.is_active(),
            }
        } else {
            ViewStatus::Ready
        };
        let stats = CollectionStats {
            total_snippets: state.snippets.len(),
            languages: languages.len().saturating_sub(1),
            categories: categories.len().saturating_sub(1),
        };

        SnippetView {
            visible,
            languages,
            categories,
            loading: state.loading,
            status,
            field_errors: state.field_errors.clone(),
            notice: state.notice.clone(),
            editor: state.editor,
            stats,
            filter: state.filter.clone(),
        }
    }

    async fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().await
    }

    /// Record field errors from a rejected draft; the store is not contacted.
    async fn reject(&self, errors: FieldErrors) -> Error {
        tracing::debug!("Rejected snippet draft: {}", errors);
        self.lock().await.field_errors = errors.clone();
        Error::Validation(errors)
    }

    /// Capture the owner and session generation for a mutation.
    async fn begin_mutation(&self) -> Result<(OwnerId, u64)> {
        let mut state = self.lock().await;
        state.field_errors = FieldErrors::default();
        let Some(owner) = state.owner.clone() else {
            state.notice = Some(Notice::error(SIGNED_OUT));
            return Err(StoreError::Unauthorized.into());
        };
        Ok((owner, state.session_generation))
    }
}

/// Keep rows owned by `owner`, first occurrence of each id only.
fn owned_unique(rows: Vec<Snippet>, owner: &OwnerId) -> Vec<Snippet> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            if &row.owner_id != owner {
                tracing::warn!(snippet_id = %row.id, "Dropping snippet owned by another user");
                return false;
            }
            if !seen.insert(row.id) {
                tracing::warn!(snippet_id = %row.id, "Dropping duplicate snippet row");
                return false;
            }
            true
        })
        .collect()
}

fn has_unique_ids(snippets: &[Snippet]) -> bool {
    let mut seen = HashSet::with_capacity(snippets.len());
    snippets.iter().all(|snippet| seen.insert(snippet.id))
}

#[cfg(test)]
mod tests;
