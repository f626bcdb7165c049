//! snippetbox-core - Core library for Snippetbox
//!
//! This crate holds the snippet models, draft validation, the remote store
//! adapter, facet derivation, filtering and the session-scoped collection
//! engine that presentation layers (the CLI today) render from.

pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod facets;
pub mod filter;
pub mod models;
pub mod state;
pub mod store;
pub mod util;
pub mod validation;

pub use collection::SnippetCollection;
pub use error::{Error, Result, StoreError, StoreResult};
pub use filter::FilterState;
pub use models::{Category, Language, OwnerId, Snippet, SnippetId};
pub use state::SnippetView;
pub use validation::{FieldErrors, SnippetDraft, SnippetPatch};
