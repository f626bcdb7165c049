use crate::commands::common::{open_collection, resolve_snippet};
use crate::error::CliError;

pub async fn run_delete(id: &str) -> Result<(), CliError> {
    let collection = open_collection().await?;
    let snippets = collection.snippets().await;
    let snippet = resolve_snippet(id, &snippets)?;

    collection.remove(snippet.id).await?;
    println!("{}", snippet.id);
    Ok(())
}
