use std::io::{self, IsTerminal, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use snippetbox_core::config::ClientConfig;
use snippetbox_core::store::SupabaseSnippetStore;
use snippetbox_core::{Snippet, SnippetCollection};

use crate::auth::auth_client;
use crate::error::CliError;

pub type CliCollection = SnippetCollection<SupabaseSnippetStore>;

#[derive(Debug, Serialize)]
pub struct SnippetListItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub language: String,
    pub category: String,
    pub code: String,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

/// Load `.env` from the working directory, then the user config directory.
pub fn load_env_files() {
    dotenvy::dotenv().ok();
    if let Some(config_dir) = dirs::config_dir() {
        dotenvy::from_path(config_dir.join("snippetbox").join("config.env")).ok();
    }
}

pub fn load_client_config() -> Result<ClientConfig, CliError> {
    ClientConfig::from_env()
        .map_err(|error| CliError::Config(error.to_string()))?
        .ok_or(CliError::NotConfigured)
}

/// Restore the stored session and load its snippet collection.
pub async fn open_collection() -> Result<CliCollection, CliError> {
    let config = load_client_config()?;
    let auth = auth_client(&config).map_err(|error| CliError::Auth(error.to_string()))?;
    let session = auth
        .restore_session()
        .await
        .map_err(|error| CliError::Auth(error.to_string()))?
        .ok_or(CliError::NotSignedIn)?;

    let store = SupabaseSnippetStore::new(&config, Some(session.access_token.clone()))?;
    let collection = SnippetCollection::new(store);
    collection.set_session(Some(session.owner_id())).await?;
    Ok(collection)
}

/// Find the one snippet whose id equals or starts with `query`.
pub fn resolve_snippet<'a>(query: &str, snippets: &'a [Snippet]) -> Result<&'a Snippet, CliError> {
    let query = normalize_snippet_identifier(query)?.to_ascii_lowercase();

    if let Some(exact) = snippets.iter().find(|snippet| snippet.id.as_str() == query) {
        return Ok(exact);
    }

    let matches = snippets
        .iter()
        .filter(|snippet| snippet.id.as_str().starts_with(&query))
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [] => Err(CliError::SnippetNotFound(query)),
        [snippet] => Ok(snippet),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|snippet| short_id(snippet))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousSnippetId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn normalize_snippet_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySnippetId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn short_id(snippet: &Snippet) -> String {
    snippet.id.as_str().chars().take(13).collect()
}

pub fn format_snippet_lines(snippets: &[Snippet], now: DateTime<Utc>) -> Vec<String> {
    snippets
        .iter()
        .map(|snippet| {
            let title = truncate(&snippet.title, 40);
            format!(
                "{:<13}  {title:<40}  {:<10}  {:<14}  {}",
                short_id(snippet),
                snippet.language.as_str(),
                snippet.category.as_str(),
                format_relative_time(snippet.updated_at, now)
            )
        })
        .collect()
}

pub fn snippet_to_list_item(snippet: &Snippet, now: DateTime<Utc>) -> SnippetListItem {
    SnippetListItem {
        id: snippet.id.as_str(),
        title: snippet.title.clone(),
        description: snippet.description.clone(),
        language: snippet.language.as_str().to_string(),
        category: snippet.category.as_str().to_string(),
        code: snippet.code.clone(),
        created_at: snippet.created_at.to_rfc3339(),
        updated_at: snippet.updated_at.to_rfc3339(),
        relative_time: format_relative_time(snippet.updated_at, now),
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated = text
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds().max(0);
    let minute = 60;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Snippet code from `--code`, then `--file`, then piped stdin.
pub fn resolve_code(code: Option<String>, file: Option<&Path>) -> Result<String, CliError> {
    if let Some(code) = code {
        return Ok(code);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    read_piped_stdin()?.ok_or(CliError::EmptyCode)
}

/// Replacement code for an edit; stdin is never consulted.
pub fn resolve_edited_code(
    code: Option<String>,
    file: Option<&Path>,
) -> Result<Option<String>, CliError> {
    match (code, file) {
        (Some(code), _) => Ok(Some(code)),
        (None, Some(path)) => Ok(Some(std::fs::read_to_string(path)?)),
        (None, None) => Ok(None),
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    if buffer.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(buffer))
    }
}
