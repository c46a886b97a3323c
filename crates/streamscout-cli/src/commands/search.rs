use std::sync::Arc;

use color_eyre::eyre::eyre;
use media_catalog_core::{Aggregator, ProviderResults};
use media_catalog_models::SearchItem;
use media_catalog_providers::ProviderRegistry;

use crate::commands::provider_or_fail;
use crate::output::{shows_table, Output};

pub async fn run(
    registry: &Arc<ProviderRegistry>,
    query: &str,
    provider: Option<&str>,
    page: u32,
    out: &Output,
) -> color_eyre::Result<()> {
    let results: Vec<ProviderResults> = match provider {
        Some(name) => {
            let provider = provider_or_fail(registry, name)?;
            let items = provider
                .search(query, page)
                .await
                .map_err(|e| eyre!("{}: {}", name, e))?;
            vec![ProviderResults {
                provider: name.to_string(),
                items,
            }]
        }
        None => Aggregator::new(Arc::clone(registry)).search(query, page).await,
    };

    if !out.is_human() {
        return out.print_json(&results).map_err(Into::into);
    }

    for result in &results {
        out.heading(format!("[{}]", result.provider));
        if result.items.is_empty() {
            out.note("no results");
            continue;
        }

        let shows: Vec<_> = result
            .items
            .iter()
            .filter_map(|item| match item {
                SearchItem::Show(show) => Some(show.clone()),
                _ => None,
            })
            .collect();
        if !shows.is_empty() {
            println!("{}", shows_table(&shows));
        }

        for item in &result.items {
            match item {
                SearchItem::Genre(genre) => println!("  genre: {} ({})", genre.name, genre.id),
                SearchItem::People(people) => println!("  person: {} ({})", people.name, people.id),
                SearchItem::Show(_) => {}
            }
        }
    }
    Ok(())
}
