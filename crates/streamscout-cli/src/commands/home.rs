use std::sync::Arc;

use color_eyre::eyre::eyre;
use media_catalog_core::{Aggregator, HomeRow};
use media_catalog_providers::ProviderRegistry;

use crate::commands::provider_or_fail;
use crate::output::{shows_table, Output};

pub async fn run(
    registry: &Arc<ProviderRegistry>,
    provider: Option<&str>,
    out: &Output,
) -> color_eyre::Result<()> {
    let rows: Vec<HomeRow> = match provider {
        Some(name) => {
            let provider = provider_or_fail(registry, name)?;
            let categories = provider
                .get_home()
                .await
                .map_err(|e| eyre!("{}: {}", name, e))?;
            categories
                .into_iter()
                .map(|category| HomeRow {
                    provider: name.to_string(),
                    category,
                })
                .collect()
        }
        None => Aggregator::new(Arc::clone(registry)).home().await,
    };

    if !out.is_human() {
        return out.print_json(&rows).map_err(Into::into);
    }

    if rows.is_empty() {
        out.note("No home screen rows. Are the providers reachable?");
        return Ok(());
    }

    for row in &rows {
        let label = if row.category.is_featured() {
            format!("[{}] Featured", row.provider)
        } else {
            format!("[{}] {}", row.provider, row.category.name)
        };
        out.heading(label);
        println!("{}", shows_table(&row.category.shows));
    }
    Ok(())
}
