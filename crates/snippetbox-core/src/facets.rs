//! Filter facet derivation (language/category option lists).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{Category, Language, Snippet};

/// Facet value meaning "no filter on this dimension".
pub const ALL: &str = "all";

/// A selectable facet value with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

/// Distinct languages present in `snippets`, sorted, prefixed with [`ALL`].
#[must_use]
pub fn derive_languages(snippets: &[Snippet]) -> Vec<String> {
    with_sentinel(snippets.iter().map(|snippet| snippet.language.as_str()))
}

/// Distinct categories present in `snippets`, sorted, prefixed with [`ALL`].
#[must_use]
pub fn derive_categories(snippets: &[Snippet]) -> Vec<String> {
    with_sentinel(snippets.iter().map(|snippet| snippet.category.as_str()))
}

/// Language facet values paired with picker labels.
#[must_use]
pub fn language_options(snippets: &[Snippet]) -> Vec<FacetOption> {
    derive_languages(snippets)
        .into_iter()
        .map(|value| {
            let label = if value == ALL {
                "All Languages".to_string()
            } else {
                value
                    .parse::<Language>()
                    .map_or_else(|_| value.clone(), Language::display_name)
            };
            FacetOption { value, label }
        })
        .collect()
}

/// Category facet values paired with picker labels.
#[must_use]
pub fn category_options(snippets: &[Snippet]) -> Vec<FacetOption> {
    derive_categories(snippets)
        .into_iter()
        .map(|value| {
            let label = if value == ALL {
                "All Categories".to_string()
            } else {
                value
                    .parse::<Category>()
                    .map_or_else(|_| value.clone(), |category| category.as_str().to_string())
            };
            FacetOption { value, label }
        })
        .collect()
}

fn with_sentinel<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let distinct = values.collect::<BTreeSet<_>>();
    std::iter::once(ALL)
        .chain(distinct)
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::models::{OwnerId, SnippetId};

    fn snippet(language: Language, category: Category) -> Snippet {
        let now = Utc::now();
        Snippet {
            id: SnippetId::from_uuid(Uuid::now_v7()),
            title: "t".to_string(),
            description: None,
            code: "c".to_string(),
            language,
            category,
            owner_id: OwnerId::new("owner"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_collection_yields_only_sentinel() {
        assert_eq!(derive_languages(&[]), vec!["all"]);
        assert_eq!(derive_categories(&[]), vec!["all"]);
    }

    #[test]
    fn values_are_distinct_and_sorted() {
        let snippets = vec![
            snippet(Language::Python, Category::Database),
            snippet(Language::Bash, Category::DataStructure),
            snippet(Language::Python, Category::Algorithm),
        ];
        assert_eq!(derive_languages(&snippets), vec!["all", "bash", "python"]);
        assert_eq!(
            derive_categories(&snippets),
            vec!["all", "Algorithm", "Data Structure", "Database"]
        );
    }

    #[test]
    fn every_snippet_value_is_offered() {
        let snippets = Language::ALL
            .into_iter()
            .zip(Category::ALL.into_iter().cycle())
            .map(|(language, category)| snippet(language, category))
            .collect::<Vec<_>>();
        let languages = derive_languages(&snippets);
        let categories = derive_categories(&snippets);
        for item in &snippets {
            assert!(languages.iter().any(|value| value == item.language.as_str()));
            assert!(categories.iter().any(|value| value == item.category.as_str()));
        }
        assert_eq!(languages.len(), Language::ALL.len() + 1);
    }

    #[test]
    fn options_carry_display_labels() {
        let snippets = vec![snippet(Language::Typescript, Category::DevOps)];
        assert_eq!(
            language_options(&snippets),
            vec![
                FacetOption {
                    value: "all".to_string(),
                    label: "All Languages".to_string()
                },
                FacetOption {
                    value: "typescript".to_string(),
                    label: "Typescript".to_string()
                },
            ]
        );
        assert_eq!(category_options(&snippets)[0].label, "All Categories");
        assert_eq!(category_options(&snippets)[1].label, "DevOps");
    }
}
