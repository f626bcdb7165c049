//! Data models for Snippetbox

mod category;
mod language;
mod snippet;

pub use category::Category;
pub use language::Language;
pub use snippet::{OwnerId, Snippet, SnippetId};

/// Returned when a value is outside one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
