//! Error types for snippetbox-core

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type alias using snippetbox-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by every remote store operation
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Uniform failure kinds reported by a snippet store.
///
/// Transport-specific errors are mapped into one of these at the adapter
/// boundary and never leak further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No active session, or the store rejected the credentials
    #[error("You must be signed in to manage snippets")]
    Unauthorized,

    /// Target id is absent or not owned by the caller
    #[error("Snippet not found: {0}")]
    NotFound(String),

    /// Transport failure before the store produced an answer
    #[error("Network error: {0}")]
    Network(String),

    /// Store-reported failure with opaque detail
    #[error("Store error: {0}")]
    Unknown(String),
}

/// Errors returned by collection operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Draft rejected before reaching the store
    #[error("Invalid snippet: {0}")]
    Validation(FieldErrors),

    /// Store rejected or failed the request
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Field errors when this is a validation failure
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Store(_) => None,
        }
    }
}
