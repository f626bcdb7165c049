use snippetbox_core::SnippetPatch;

use crate::cli::EditArgs;
use crate::commands::common::{open_collection, resolve_edited_code, resolve_snippet};
use crate::error::CliError;

pub async fn run_edit(args: EditArgs) -> Result<(), CliError> {
    let EditArgs {
        id,
        title,
        description,
        clear_description,
        language,
        category,
        code,
        file,
    } = args;
    let code = resolve_edited_code(code, file.as_deref())?;
    let fields = EditFields {
        title,
        description,
        clear_description,
        language,
        category,
    };
    let patch = edit_patch(fields, code)?;

    let collection = open_collection().await?;
    let snippets = collection.snippets().await;
    let snippet = resolve_snippet(&id, &snippets)?;

    collection.update(snippet.id, &patch).await?;
    println!("{}", snippet.id);
    Ok(())
}

/// Editable fields other than code, as given on the command line
#[derive(Debug, Default)]
pub struct EditFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub language: Option<String>,
    pub category: Option<String>,
}

pub fn edit_patch(fields: EditFields, code: Option<String>) -> Result<SnippetPatch, CliError> {
    let description = if fields.clear_description {
        Some(None)
    } else {
        fields.description.map(Some)
    };
    let patch = SnippetPatch {
        title: fields.title,
        description,
        code,
        language: fields
            .language
            .map(|language| language.trim().to_ascii_lowercase()),
        category: fields.category,
    };

    if patch == SnippetPatch::default() {
        return Err(CliError::EmptyEdit);
    }
    Ok(patch)
}
