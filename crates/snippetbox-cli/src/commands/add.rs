use snippetbox_core::SnippetDraft;

use crate::cli::AddArgs;
use crate::commands::common::{open_collection, resolve_code};
use crate::error::CliError;

pub async fn run_add(args: AddArgs) -> Result<(), CliError> {
    let code = resolve_code(args.code, args.file.as_deref())?;
    let draft = SnippetDraft {
        title: args.title,
        description: args.description,
        code,
        language: args.language.trim().to_ascii_lowercase(),
        category: args.category,
    };

    let collection = open_collection().await?;
    let snippet = collection.create(&draft).await?;

    println!("{}", snippet.id);
    Ok(())
}
