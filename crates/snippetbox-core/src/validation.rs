//! Draft validation
//!
//! The only path from raw user input into a collection mutation. Drafts are
//! normalized (trimmed, empty description collapsed to `None`) and checked
//! against the field bounds and the closed language/category sets. Failures
//! are reported per field; nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Category, Language, Snippet, SnippetId};
use crate::util::normalize_text_option;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const CODE_MAX_CHARS: usize = 10_000;

/// Snippet field a validation message refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Title,
    Description,
    Code,
    Language,
    Category,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::Code => "code",
            Self::Language => "language",
            Self::Category => "category",
        }
    }
}

/// Human-readable validation messages keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Record a message; the first message for a field wins.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .iter()
            .map(|(field, message)| format!("{}: {message}", field.as_str()))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

/// Raw input for a new snippet, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code: String,
    pub language: String,
    pub category: String,
}

/// Raw partial input for editing a snippet.
///
/// `None` leaves a field untouched. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
}

impl From<SnippetDraft> for SnippetPatch {
    fn from(draft: SnippetDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            code: Some(draft.code),
            language: Some(draft.language),
            category: Some(draft.category),
        }
    }
}

/// Normalized input accepted for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedSnippet {
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub language: Language,
    pub category: Category,
}

/// Normalized partial input accepted for an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub id: SnippetId,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub code: Option<String>,
    pub language: Option<Language>,
    pub category: Option<Category>,
}

impl ValidatedPatch {
    /// True when the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.code.is_none()
            && self.language.is_none()
            && self.category.is_none()
    }

    /// Copy the patched editable fields onto `snippet`.
    ///
    /// `id`, `owner_id` and both timestamps are left alone.
    pub fn apply_to(&self, snippet: &mut Snippet) {
        if let Some(title) = &self.title {
            snippet.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            snippet.description.clone_from(description);
        }
        if let Some(code) = &self.code {
            snippet.code.clone_from(code);
        }
        if let Some(language) = self.language {
            snippet.language = language;
        }
        if let Some(category) = self.category {
            snippet.category = category;
        }
    }
}

/// Validate a draft for a new snippet.
pub fn validate_create(draft: &SnippetDraft) -> Result<ValidatedSnippet, FieldErrors> {
    let mut errors = FieldErrors::default();

    let title = check_title(&draft.title, &mut errors);
    let description = check_description(draft.description.as_deref(), &mut errors);
    let code = check_code(&draft.code, &mut errors);
    let language = check_language(&draft.language, &mut errors);
    let category = check_category(&draft.category, &mut errors);

    match (language, category) {
        (Some(language), Some(category)) if errors.is_empty() => Ok(ValidatedSnippet {
            title,
            description,
            code,
            language,
            category,
        }),
        _ => Err(errors),
    }
}

/// Validate a partial edit for the snippet identified by `id`.
pub fn validate_update(id: &str, patch: &SnippetPatch) -> Result<ValidatedPatch, FieldErrors> {
    let mut errors = FieldErrors::default();

    let id = id.parse::<SnippetId>().ok();
    if id.is_none() {
        errors.insert(Field::Id, "Invalid snippet ID");
    }

    let title = patch
        .title
        .as_deref()
        .map(|title| check_title(title, &mut errors));
    let description = patch
        .description
        .as_ref()
        .map(|description| check_description(description.as_deref(), &mut errors));
    let code = patch.code.as_deref().map(|code| check_code(code, &mut errors));
    let language = patch
        .language
        .as_deref()
        .and_then(|language| check_language(language, &mut errors));
    let category = patch
        .category
        .as_deref()
        .and_then(|category| check_category(category, &mut errors));

    match id {
        Some(id) if errors.is_empty() => Ok(ValidatedPatch {
            id,
            title,
            description,
            code,
            language,
            category,
        }),
        _ => Err(errors),
    }
}

fn check_title(raw: &str, errors: &mut FieldErrors) -> String {
    let title = raw.trim();
    if title.is_empty() {
        errors.insert(Field::Title, "Title is required");
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.insert(Field::Title, "Title must be less than 100 characters");
    }
    title.to_string()
}

fn check_description(raw: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let description = normalize_text_option(raw.map(ToString::to_string))?;
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.insert(
            Field::Description,
            "Description must be less than 500 characters",
        );
    }
    Some(description)
}

fn check_code(raw: &str, errors: &mut FieldErrors) -> String {
    let code = normalize_code(raw);
    if code.is_empty() {
        errors.insert(Field::Code, "Code is required");
    } else if code.chars().count() > CODE_MAX_CHARS {
        errors.insert(Field::Code, "Code must be less than 10,000 characters");
    }
    code.to_string()
}

fn check_language(raw: &str, errors: &mut FieldErrors) -> Option<Language> {
    let value = raw.trim();
    if value.is_empty() {
        errors.insert(Field::Language, "Language is required");
        return None;
    }
    match value.parse() {
        Ok(language) => Some(language),
        Err(_) => {
            errors.insert(Field::Language, format!("Unsupported language: {value}"));
            None
        }
    }
}

fn check_category(raw: &str, errors: &mut FieldErrors) -> Option<Category> {
    let value = raw.trim();
    if value.is_empty() {
        errors.insert(Field::Category, "Category is required");
        return None;
    }
    match value.parse() {
        Ok(category) => Some(category),
        Err(_) => {
            errors.insert(Field::Category, format!("Unsupported category: {value}"));
            None
        }
    }
}

/// Strip leading blank lines and trailing whitespace, keeping indentation.
fn normalize_code(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    let start = trimmed
        .find(|c: char| !c.is_whitespace())
        .map_or(trimmed.len(), |first| {
            trimmed[..first].rfind('\n').map_or(0, |newline| newline + 1)
        });
    &trimmed[start..]
}
