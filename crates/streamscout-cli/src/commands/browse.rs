use std::sync::Arc;

use color_eyre::eyre::eyre;
use media_catalog_providers::ProviderRegistry;

use crate::commands::provider_or_fail;
use crate::output::{shows_table, Output};

pub async fn movies(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    page: u32,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let shows = adapter
        .get_movies(page)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&shows).map_err(Into::into);
    }
    out.heading(format!("[{}] Movies, page {}", provider, page));
    println!("{}", shows_table(&shows));
    Ok(())
}

pub async fn shows(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    page: u32,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let shows = adapter
        .get_tv_shows(page)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&shows).map_err(Into::into);
    }
    out.heading(format!("[{}] TV Shows, page {}", provider, page));
    println!("{}", shows_table(&shows));
    Ok(())
}

pub async fn genre(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    id: &str,
    page: u32,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let genre = adapter
        .get_genre(id, page)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&genre).map_err(Into::into);
    }
    out.heading(format!("[{}] {}, page {}", provider, genre.name, page));
    println!("{}", shows_table(&genre.shows));
    Ok(())
}
