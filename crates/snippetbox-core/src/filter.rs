//! Snippet list filtering (free-text search + facet selection).

use serde::{Deserialize, Serialize};

use crate::facets::ALL;
use crate::models::Snippet;

/// Current search term and facet selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_term: String,
    pub selected_language: String,
    pub selected_category: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            selected_language: ALL.to_string(),
            selected_category: ALL.to_string(),
        }
    }
}

impl FilterState {
    /// True when any dimension narrows the list
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search_term.is_empty()
            || self.selected_language != ALL
            || self.selected_category != ALL
    }

    /// Whether `snippet` passes every dimension of this filter.
    #[must_use]
    pub fn matches(&self, snippet: &Snippet) -> bool {
        matches_search(snippet, &self.search_term.to_lowercase())
            && facet_matches(&self.selected_language, snippet.language.as_str())
            && facet_matches(&self.selected_category, snippet.category.as_str())
    }
}

/// Snippets passing `filter`, in collection order.
#[must_use]
pub fn visible_snippets(snippets: &[Snippet], filter: &FilterState) -> Vec<Snippet> {
    snippets
        .iter()
        .filter(|snippet| filter.matches(snippet))
        .cloned()
        .collect()
}

fn matches_search(snippet: &Snippet, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    snippet.title.to_lowercase().contains(query)
        || snippet
            .description
            .as_ref()
            .is_some_and(|description| description.to_lowercase().contains(query))
        || snippet.code.to_lowercase().contains(query)
}

fn facet_matches(selected: &str, value: &str) -> bool {
    selected == ALL || selected == value
}
