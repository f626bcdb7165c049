//! View state handed to presentation layers.

use serde::Serialize;

use crate::facets::FacetOption;
use crate::filter::FilterState;
use crate::models::{Snippet, SnippetId};
use crate::validation::FieldErrors;

/// What the snippet list area should show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ViewStatus {
    Loading,
    /// The last load failed; offer a retry instead of the empty state
    LoadFailed,
    /// Nothing to show; `filtered` is true when filters hide existing snippets
    Empty { filtered: bool },
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient, dismissible message about the last operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

/// Create/edit form state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum EditorState {
    #[default]
    Closed,
    Creating,
    Editing(SnippetId),
}

/// Headline counts for the collection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total_snippets: usize,
    pub languages: usize,
    pub categories: usize,
}

/// Snapshot of everything a presentation layer renders
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnippetView {
    pub visible: Vec<Snippet>,
    pub languages: Vec<FacetOption>,
    pub categories: Vec<FacetOption>,
    pub loading: bool,
    pub status: ViewStatus,
    pub field_errors: FieldErrors,
    pub notice: Option<Notice>,
    pub editor: EditorState,
    pub stats: CollectionStats,
    pub filter: FilterState,
}
