use std::io;

use snippetbox_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] snippetbox_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No snippet code provided")]
    EmptyCode,
    #[error("Snippet ID cannot be empty")]
    EmptySnippetId,
    #[error("Snippet not found for id/prefix: {0}")]
    SnippetNotFound(String),
    #[error("{0}")]
    AmbiguousSnippetId(String),
    #[error("Nothing to change; pass at least one field to edit")]
    EmptyEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Snippetbox is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY.")]
    NotConfigured,
    #[error("Not signed in. Run `snippetbox auth login` first.")]
    NotSignedIn,
}

impl From<StoreError> for CliError {
    fn from(error: StoreError) -> Self {
        Self::Core(error.into())
    }
}

impl CliError {
    /// Lines printed to stderr; validation failures get one line per field.
    pub fn render(&self) -> Vec<String> {
        let Self::Core(error) = self else {
            return vec![format!("Error: {self}")];
        };
        let Some(errors) = error.field_errors() else {
            return vec![format!("Error: {error}")];
        };

        std::iter::once("Error: Invalid snippet".to_string())
            .chain(
                errors
                    .iter()
                    .map(|(field, message)| format!("  {}: {message}", field.as_str())),
            )
            .collect()
    }
}
