//! Snippet model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Language};

/// Server-assigned identifier of a stored snippet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetId(Uuid);

impl SnippetId {
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SnippetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Identifier of the authenticated user owning a snippet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored code snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    /// `None` when the snippet has no description; never `Some("")`
    pub description: Option<String>,
    pub code: String,
    pub language: Language,
    pub category: Category,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    /// First line of the code body, collapsed and truncated to `max_chars`
    #[must_use]
    pub fn code_preview(&self, max_chars: usize) -> String {
        let first_line = self
            .code
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
            .trim();
        let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.chars().count() <= max_chars {
            collapsed
        } else {
            let mut truncated = collapsed
                .chars()
                .take(max_chars.saturating_sub(3))
                .collect::<String>();
            truncated.push_str("...");
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: &str) -> Snippet {
        let now = Utc::now();
        Snippet {
            id: SnippetId::from_uuid(Uuid::now_v7()),
            title: "Sample".to_string(),
            description: None,
            code: code.to_string(),
            language: Language::Rust,
            category: Category::Utility,
            owner_id: OwnerId::new("user-1"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn snippet_id_parse() {
        let id = SnippetId::from_uuid(Uuid::now_v7());
        let parsed: SnippetId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<SnippetId>().is_err());
    }

    #[test]
    fn code_preview_skips_blank_lines() {
        let snippet = sample("\n\n   fn main() {\n}\n");
        assert_eq!(snippet.code_preview(40), "fn main() {");
    }

    #[test]
    fn code_preview_truncates() {
        let snippet = sample("let value = compute_something_expensive(input);");
        assert_eq!(snippet.code_preview(12), "let value...");
    }

    #[test]
    fn snippet_serializes_enums_as_column_values() {
        let json = serde_json::to_value(sample("x")).unwrap();
        assert_eq!(json["language"], "rust");
        assert_eq!(json["category"], "Utility");
        assert_eq!(json["owner_id"], "user-1");
    }
}
