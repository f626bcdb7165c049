//! In-process snippet store with server-side semantics.
//!
//! Assigns ids and timestamps like the hosted store does, scopes every
//! operation to the owner, and lets tests inject failures per operation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::SnippetStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{OwnerId, Snippet, SnippetId};
use crate::validation::{ValidatedPatch, ValidatedSnippet};

/// Store operation kinds, for failure injection and call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<Snippet>,
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
    calls: Vec<StoreOp>,
}

/// Snippet store held entirely in memory
#[derive(Default)]
pub struct MemorySnippetStore {
    state: Mutex<MemoryState>,
}

impl MemorySnippetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows.
    #[must_use]
    pub fn with_rows(rows: Vec<Snippet>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                rows,
                ..MemoryState::default()
            }),
        }
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Operations received so far, in arrival order
    pub fn calls(&self) -> Vec<StoreOp> {
        self.lock().calls.clone()
    }

    /// Every stored row, regardless of owner
    pub fn rows(&self) -> Vec<Snippet> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, op: StoreOp) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.calls.push(op);
        if let Some(error) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Snippet>> {
        let state = self.begin(StoreOp::List)?;
        let mut rows = state
            .rows
            .iter()
            .filter(|row| &row.owner_id == owner)
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert(&self, owner: &OwnerId, input: &ValidatedSnippet) -> StoreResult<Snippet> {
        let mut state = self.begin(StoreOp::Insert)?;
        let now = Utc::now();
        let snippet = Snippet {
            id: SnippetId::from_uuid(Uuid::now_v7()),
            title: input.title.clone(),
            description: input.description.clone(),
            code: input.code.clone(),
            language: input.language,
            category: input.category,
            owner_id: owner.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.push(snippet.clone());
        Ok(snippet)
    }

    async fn update_by_id(&self, owner: &OwnerId, patch: &ValidatedPatch) -> StoreResult<()> {
        let mut state = self.begin(StoreOp::Update)?;
        let row = state
            .rows
            .iter_mut()
            .find(|row| row.id == patch.id && &row.owner_id == owner)
            .ok_or_else(|| StoreError::NotFound(patch.id.to_string()))?;
        patch.apply_to(row);
        row.updated_at = Utc::now().max(row.created_at);
        Ok(())
    }

    async fn delete_by_id(&self, owner: &OwnerId, id: &SnippetId) -> StoreResult<()> {
        let mut state = self.begin(StoreOp::Delete)?;
        let before = state.rows.len();
        state
            .rows
            .retain(|row| !(&row.id == id && &row.owner_id == owner));
        if state.rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
