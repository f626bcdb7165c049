use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::*;
use crate::error::StoreResult;
use crate::models::{Category, Language};
use crate::state::NoticeKind;
use crate::store::{MemorySnippetStore, StoreOp};
use crate::validation::{Field, ValidatedPatch, ValidatedSnippet};

/// Memory store whose responses can be held back until a test releases them.
///
/// The underlying operation is applied immediately; only the reply waits.
#[derive(Default)]
struct GatedStore {
    inner: MemorySnippetStore,
    gates: Mutex<HashMap<StoreOp, VecDeque<oneshot::Receiver<()>>>>,
}

impl GatedStore {
    fn with_rows(rows: Vec<Snippet>) -> Self {
        Self {
            inner: MemorySnippetStore::with_rows(rows),
            gates: Mutex::default(),
        }
    }

    /// Hold the next reply to `op` until the returned sender fires.
    fn gate(&self, op: StoreOp) -> oneshot::Sender<()> {
        let (release, wait) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(wait);
        release
    }

    async fn hold(&self, op: StoreOp) {
        let gate = self.gates.lock().unwrap().get_mut(&op).and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl SnippetStore for GatedStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Snippet>> {
        let result = self.inner.list_by_owner(owner).await;
        self.hold(StoreOp::List).await;
        result
    }

    async fn insert(&self, owner: &OwnerId, input: &ValidatedSnippet) -> StoreResult<Snippet> {
        let result = self.inner.insert(owner, input).await;
        self.hold(StoreOp::Insert).await;
        result
    }

    async fn update_by_id(&self, owner: &OwnerId, patch: &ValidatedPatch) -> StoreResult<()> {
        let result = self.inner.update_by_id(owner, patch).await;
        self.hold(StoreOp::Update).await;
        result
    }

    async fn delete_by_id(&self, owner: &OwnerId, id: &SnippetId) -> StoreResult<()> {
        let result = self.inner.delete_by_id(owner, id).await;
        self.hold(StoreOp::Delete).await;
        result
    }
}

fn alice() -> OwnerId {
    OwnerId::new("alice")
}

fn draft(title: &str, language: &str) -> SnippetDraft {
    SnippetDraft {
        title: title.to_string(),
        description: None,
        code: "print(1)".to_string(),
        language: language.to_string(),
        category: "Utility".to_string(),
    }
}

fn stored(owner: &OwnerId, title: &str, language: Language, age_minutes: i64) -> Snippet {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Snippet {
        id: SnippetId::from_uuid(Uuid::new_v4()),
        title: title.to_string(),
        description: None,
        code: format!("// {title}"),
        language,
        category: Category::Utility,
        owner_id: owner.clone(),
        created_at,
        updated_at: created_at,
    }
}

fn titles(snippets: &[Snippet]) -> Vec<String> {
    snippets.iter().map(|snippet| snippet.title.clone()).collect()
}

fn assert_unique(snippets: &[Snippet]) {
    let ids = snippets.iter().map(|snippet| snippet.id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), snippets.len());
}

async fn signed_in(store: GatedStore) -> SnippetCollection<GatedStore> {
    let collection = SnippetCollection::new(store);
    collection.set_session(Some(alice())).await.unwrap();
    collection
}

#[tokio::test]
async fn first_create_populates_facets() {
    let collection = signed_in(GatedStore::default()).await;

    let created = collection.create(&draft("Hi", "python")).await.unwrap();

    assert_eq!(collection.snippets().await, vec![created.clone()]);
    assert_eq!(created.owner_id, alice());
    assert_eq!(collection.languages().await, vec!["all", "python"]);
    assert_eq!(collection.categories().await, vec!["all", "Utility"]);

    let view = collection.view().await;
    assert_eq!(view.status, ViewStatus::Ready);
    assert_eq!(view.stats.total_snippets, 1);
    assert_eq!(view.stats.languages, 1);
    let notice = view.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.title, "Snippet created");
}

#[tokio::test]
async fn newest_snippet_goes_first() {
    let collection = signed_in(GatedStore::default()).await;
    collection.create(&draft("Older", "go")).await.unwrap();
    collection.create(&draft("Newer", "rust")).await.unwrap();

    assert_eq!(titles(&collection.snippets().await), vec!["Newer", "Older"]);
}

#[tokio::test]
async fn language_filter_keeps_collection_order() {
    let owner = alice();
    let store = GatedStore::with_rows(vec![
        stored(&owner, "js newest", Language::Javascript, 1),
        stored(&owner, "py", Language::Python, 2),
        stored(&owner, "js oldest", Language::Javascript, 3),
    ]);
    let collection = signed_in(store).await;

    collection.select_language("javascript").await;

    assert_eq!(
        titles(&collection.visible().await),
        vec!["js newest", "js oldest"]
    );
    assert_eq!(collection.snippets().await.len(), 3);
}

#[tokio::test]
async fn invalid_draft_never_reaches_store() {
    let collection = signed_in(GatedStore::default()).await;
    collection.open_new().await;

    let error = collection.create(&draft("", "python")).await.unwrap_err();

    let errors = error.field_errors().unwrap();
    assert_eq!(errors.get(Field::Title), Some("Title is required"));
    assert_eq!(collection.store().inner.calls(), vec![StoreOp::List]);
    assert!(collection.snippets().await.is_empty());

    let view = collection.view().await;
    assert_eq!(view.field_errors.get(Field::Title), Some("Title is required"));
    assert_eq!(view.editor, EditorState::Creating);
}

#[tokio::test]
async fn update_confirmed_after_delete_does_not_resurrect() {
    let collection = signed_in(GatedStore::default()).await;
    let snippet = collection.create(&draft("Hi", "python")).await.unwrap();

    let release = collection.store().gate(StoreOp::Update);
    let patch = SnippetPatch {
        title: Some("Renamed".to_string()),
        ..SnippetPatch::default()
    };
    let update = collection.update(snippet.id, &patch);
    let remove = async {
        let removed = collection.remove(snippet.id).await;
        let _ = release.send(());
        removed
    };
    let (updated, removed) = tokio::join!(update, remove);

    updated.unwrap();
    removed.unwrap();
    assert!(collection.get(snippet.id).await.is_none());
    assert!(collection.snippets().await.is_empty());
}

#[tokio::test]
async fn failed_load_reports_error_and_stops_loading() {
    let store = GatedStore::default();
    store
        .inner
        .fail_next(StoreOp::List, StoreError::Network("offline".to_string()));
    let collection = SnippetCollection::new(store);

    let error = collection.set_session(Some(alice())).await.unwrap_err();

    assert!(matches!(error, Error::Store(StoreError::Network(_))));
    assert!(collection.snippets().await.is_empty());
    assert!(!collection.loading().await);
    let view = collection.view().await;
    assert_eq!(view.status, ViewStatus::LoadFailed);
    assert_eq!(
        view.notice.unwrap().description,
        "Failed to load snippets. Please try again."
    );

    collection.load().await.unwrap();
    assert_eq!(collection.view().await.status, ViewStatus::Empty { filtered: false });
}

#[tokio::test]
async fn failed_reload_keeps_previous_contents() {
    let owner = alice();
    let store = GatedStore::with_rows(vec![
        stored(&owner, "one", Language::Rust, 1),
        stored(&owner, "two", Language::Go, 2),
    ]);
    let collection = signed_in(store).await;
    let before = collection.snippets().await;

    collection
        .store()
        .inner
        .fail_next(StoreOp::List, StoreError::Unknown("boom".to_string()));
    assert!(collection.load().await.is_err());

    assert_eq!(collection.snippets().await, before);
}

#[tokio::test]
async fn failed_mutations_leave_collection_untouched() {
    let collection = signed_in(GatedStore::default()).await;
    let snippet = collection.create(&draft("Keep", "python")).await.unwrap();
    let before = collection.snippets().await;
    let store = &collection.store().inner;

    store.fail_next(StoreOp::Insert, StoreError::Network("offline".to_string()));
    assert!(collection.create(&draft("New", "go")).await.is_err());
    assert_eq!(collection.snippets().await, before);

    store.fail_next(StoreOp::Update, StoreError::Unauthorized);
    let patch = SnippetPatch {
        title: Some("Changed".to_string()),
        ..SnippetPatch::default()
    };
    assert!(collection.update(snippet.id, &patch).await.is_err());
    assert_eq!(collection.snippets().await, before);

    store.fail_next(StoreOp::Delete, StoreError::NotFound(snippet.id.to_string()));
    assert!(collection.remove(snippet.id).await.is_err());
    assert_eq!(collection.snippets().await, before);

    let notice = collection.view().await.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.description, "Failed to delete snippet. Please try again.");
}

#[tokio::test]
async fn update_patches_only_the_target() {
    let collection = signed_in(GatedStore::default()).await;
    let first = collection.create(&draft("First", "python")).await.unwrap();
    let second = collection.create(&draft("Second", "go")).await.unwrap();

    let patch = SnippetPatch {
        description: Some(Some("  now described ".to_string())),
        language: Some("rust".to_string()),
        ..SnippetPatch::default()
    };
    collection.update(first.id, &patch).await.unwrap();

    let updated = collection.get(first.id).await.unwrap();
    assert_eq!(updated.title, "First");
    assert_eq!(updated.description.as_deref(), Some("now described"));
    assert_eq!(updated.language, Language::Rust);
    assert_eq!(updated.created_at, first.created_at);
    assert!(updated.updated_at >= updated.created_at);
    assert_eq!(collection.get(second.id).await, Some(second));
    assert_eq!(
        collection.view().await.notice.unwrap().title,
        "Snippet updated"
    );
}

#[tokio::test]
async fn mixed_operations_keep_ids_unique() {
    let collection = signed_in(GatedStore::default()).await;
    let mut ids = Vec::new();
    for index in 0..5 {
        let snippet = collection
            .create(&draft(&format!("Snippet {index}"), "bash"))
            .await
            .unwrap();
        ids.push(snippet.id);
    }
    collection.remove(ids[1]).await.unwrap();
    collection
        .update(ids[3], &SnippetPatch::from(draft("Edited", "c")))
        .await
        .unwrap();
    collection.load().await.unwrap();
    collection.create(&draft("Late", "bash")).await.unwrap();

    let snippets = collection.snippets().await;
    assert_unique(&snippets);
    assert_eq!(snippets.len(), 5);
    assert!(snippets.iter().all(|snippet| snippet.owner_id == alice()));
}

#[tokio::test]
async fn concurrent_creates_both_land() {
    let collection = signed_in(GatedStore::default()).await;

    let (draft_a, draft_b) = (draft("A", "python"), draft("B", "python"));
    let (first, second) = tokio::join!(collection.create(&draft_a), collection.create(&draft_b));

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.id, second.id);
    let snippets = collection.snippets().await;
    assert_eq!(snippets.len(), 2);
    assert_unique(&snippets);
}

#[tokio::test]
async fn signed_out_collection_is_inert() {
    let collection = SnippetCollection::new(GatedStore::default());

    collection.load().await.unwrap();
    assert!(!collection.loading().await);

    let error = collection.create(&draft("Hi", "python")).await.unwrap_err();
    assert!(matches!(error, Error::Store(StoreError::Unauthorized)));
    assert!(collection.store().inner.calls().is_empty());
}

#[tokio::test]
async fn sign_out_clears_collection() {
    let owner = alice();
    let store = GatedStore::with_rows(vec![stored(&owner, "mine", Language::Go, 1)]);
    let collection = signed_in(store).await;
    assert_eq!(collection.snippets().await.len(), 1);

    collection.set_session(None).await.unwrap();

    assert!(collection.snippets().await.is_empty());
    assert!(!collection.loading().await);
    assert_eq!(collection.owner().await, None);
}

#[tokio::test]
async fn loading_is_set_while_load_is_in_flight() {
    let collection = signed_in(GatedStore::default()).await;
    let release = collection.store().gate(StoreOp::List);

    let load = collection.load();
    let probe = async {
        let during = collection.loading().await;
        let _ = release.send(());
        during
    };
    let (loaded, during) = tokio::join!(load, probe);

    loaded.unwrap();
    assert!(during);
    assert!(!collection.loading().await);
}

#[tokio::test]
async fn load_from_previous_session_is_discarded() {
    let bob = OwnerId::new("bob");
    let store = GatedStore::with_rows(vec![
        stored(&alice(), "alice's", Language::Go, 1),
        stored(&bob, "bob's", Language::Rust, 1),
    ]);
    let collection = SnippetCollection::new(store);
    let release = collection.store().gate(StoreOp::List);

    let first = collection.set_session(Some(alice()));
    let second = async {
        let switched = collection.set_session(Some(bob.clone())).await;
        let _ = release.send(());
        switched
    };
    let (first, second) = tokio::join!(first, second);

    first.unwrap();
    second.unwrap();
    assert_eq!(collection.owner().await, Some(bob));
    assert_eq!(titles(&collection.snippets().await), vec!["bob's"]);
    assert!(!collection.loading().await);
}

#[tokio::test]
async fn editor_closes_only_on_success() {
    let collection = signed_in(GatedStore::default()).await;
    collection.open_new().await;

    collection
        .store()
        .inner
        .fail_next(StoreOp::Insert, StoreError::Network("offline".to_string()));
    assert!(collection.create(&draft("Hi", "python")).await.is_err());
    assert_eq!(collection.view().await.editor, EditorState::Creating);

    let snippet = collection.create(&draft("Hi", "python")).await.unwrap();
    assert_eq!(collection.view().await.editor, EditorState::Closed);

    let prefill = collection.open_edit(snippet.id).await.unwrap();
    assert_eq!(prefill.title, "Hi");
    assert_eq!(collection.view().await.editor, EditorState::Editing(snippet.id));

    collection.remove(snippet.id).await.unwrap();
    assert_eq!(collection.view().await.editor, EditorState::Closed);
    assert!(collection.open_edit(snippet.id).await.is_none());
}

#[tokio::test]
async fn filtered_empty_state_differs_from_empty_collection() {
    let collection = signed_in(GatedStore::default()).await;
    assert_eq!(
        collection.view().await.status,
        ViewStatus::Empty { filtered: false }
    );

    collection.create(&draft("Hi", "python")).await.unwrap();
    collection.set_search_term("nothing matches this").await;
    assert_eq!(
        collection.view().await.status,
        ViewStatus::Empty { filtered: true }
    );

    collection.reset_filters().await;
    assert_eq!(collection.view().await.status, ViewStatus::Ready);
}

#[tokio::test]
async fn dismissed_notice_stays_gone() {
    let collection = signed_in(GatedStore::default()).await;
    collection.create(&draft("Hi", "python")).await.unwrap();
    assert!(collection.view().await.notice.is_some());

    collection.dismiss_notice().await;
    assert_eq!(collection.view().await.notice, None);
}

#[tokio::test]
async fn delete_during_load_stays_deleted() {
    let owner = alice();
    let keep = stored(&owner, "keep", Language::Go, 2);
    let doomed = stored(&owner, "doomed", Language::Rust, 1);
    let collection = signed_in(GatedStore::with_rows(vec![keep, doomed.clone()])).await;
    let release = collection.store().gate(StoreOp::List);

    let load = collection.load();
    let delete = async {
        let removed = collection.remove(doomed.id).await;
        let _ = release.send(());
        removed
    };
    let (loaded, removed) = tokio::join!(load, delete);

    loaded.unwrap();
    removed.unwrap();
    assert_eq!(titles(&collection.snippets().await), vec!["keep"]);
    assert_eq!(collection.store().inner.rows().len(), 1);
}

#[tokio::test]
async fn create_during_load_is_kept() {
    let collection = signed_in(GatedStore::default()).await;
    let release = collection.store().gate(StoreOp::List);
    let new_draft = draft("new", "python");

    let load = collection.load();
    let create = async {
        let created = collection.create(&new_draft).await;
        let _ = release.send(());
        created
    };
    let (loaded, created) = tokio::join!(load, create);

    loaded.unwrap();
    let created = created.unwrap();
    assert_eq!(collection.snippets().await, vec![created]);
    assert_unique(&collection.snippets().await);
}

#[tokio::test]
async fn update_during_load_is_not_reverted() {
    let owner = alice();
    let original = stored(&owner, "before", Language::Go, 1);
    let collection = signed_in(GatedStore::with_rows(vec![original.clone()])).await;
    let release = collection.store().gate(StoreOp::List);
    let patch = SnippetPatch {
        title: Some("after".to_string()),
        ..SnippetPatch::default()
    };

    let load = collection.load();
    let update = async {
        let updated = collection.update(original.id, &patch).await;
        let _ = release.send(());
        updated
    };
    let (loaded, updated) = tokio::join!(load, update);

    loaded.unwrap();
    updated.unwrap();
    assert_eq!(titles(&collection.snippets().await), vec!["after"]);
}

#[tokio::test]
async fn reload_after_settled_mutations_matches_store() {
    let owner = alice();
    let collection = signed_in(GatedStore::with_rows(vec![stored(&owner, "one", Language::Go, 1)])).await;
    collection.create(&draft("two", "rust")).await.unwrap();

    collection.load().await.unwrap();

    assert_eq!(titles(&collection.snippets().await), vec!["two", "one"]);
}
