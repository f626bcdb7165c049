use serde::Serialize;
use snippetbox_core::facets::FacetOption;

use crate::commands::common::open_collection;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct FacetListing {
    languages: Vec<FacetOption>,
    categories: Vec<FacetOption>,
}

pub async fn run_facets(as_json: bool) -> Result<(), CliError> {
    let collection = open_collection().await?;
    let view = collection.view().await;
    let listing = FacetListing {
        languages: view.languages,
        categories: view.categories,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        for line in format_facet_lines("Languages", &listing.languages)
            .into_iter()
            .chain(format_facet_lines("Categories", &listing.categories))
        {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_facet_lines(heading: &str, options: &[FacetOption]) -> Vec<String> {
    std::iter::once(format!("{heading}:"))
        .chain(
            options
                .iter()
                .map(|option| format!("  {:<16}  {}", option.value, option.label)),
        )
        .collect()
}
