use chrono::Utc;
use snippetbox_core::state::ViewStatus;

use crate::cli::ListArgs;
use crate::commands::common::{
    format_snippet_lines, open_collection, snippet_to_list_item, SnippetListItem,
};
use crate::error::CliError;

pub async fn run_list(args: ListArgs) -> Result<(), CliError> {
    let collection = open_collection().await?;

    if let Some(search) = args.search {
        collection.set_search_term(search).await;
    }
    if let Some(language) = args.language {
        collection.select_language(language.trim().to_ascii_lowercase()).await;
    }
    if let Some(category) = args.category {
        collection.select_category(category.trim()).await;
    }

    let view = collection.view().await;
    let now = Utc::now();

    if args.json {
        let items = view
            .visible
            .iter()
            .map(|snippet| snippet_to_list_item(snippet, now))
            .collect::<Vec<SnippetListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    match view.status {
        ViewStatus::Empty { filtered: true } => {
            println!("No snippets found");
            println!("Try adjusting your search or filters");
        }
        ViewStatus::Empty { filtered: false } => {
            println!("No snippets yet");
            println!("Create your first snippet with `snippetbox add`");
        }
        _ => {
            for line in format_snippet_lines(&view.visible, now) {
                println!("{line}");
            }
            println!(
                "\n{} of {} snippets, {} languages, {} categories",
                view.visible.len(),
                view.stats.total_snippets,
                view.stats.languages,
                view.stats.categories
            );
        }
    }

    Ok(())
}
