use std::sync::Arc;

use color_eyre::eyre::eyre;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use media_catalog_providers::ProviderRegistry;
use owo_colors::OwoColorize;

use crate::commands::provider_or_fail;
use crate::output::Output;

pub async fn movie(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    id: &str,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let movie = adapter
        .get_movie(id)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&movie).map_err(Into::into);
    }

    println!("{}", movie.title.bold());
    if let Some(rating) = movie.rating {
        println!("Rating: {:.1}", rating);
    }
    if let Some(released) = movie.released {
        println!("Released: {}", released);
    }
    if let Some(runtime) = movie.runtime {
        println!("Runtime: {} min", runtime);
    }
    if !movie.genres.is_empty() {
        let names: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres: {}", names.join(", "));
    }
    if !movie.cast.is_empty() {
        let names: Vec<&str> = movie.cast.iter().map(|p| p.name.as_str()).collect();
        println!("Cast: {}", names.join(", "));
    }
    if let Some(overview) = &movie.overview {
        println!("\n{}", overview);
    }
    Ok(())
}

pub async fn show(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    id: &str,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let show = adapter
        .get_tv_show(id)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&show).map_err(Into::into);
    }

    println!("{}", show.title.bold());
    if let Some(rating) = show.rating {
        println!("Rating: {:.1}", rating);
    }
    if !show.genres.is_empty() {
        let names: Vec<&str> = show.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres: {}", names.join(", "));
    }
    if let Some(overview) = &show.overview {
        println!("\n{}", overview);
    }

    if !show.seasons.is_empty() {
        out.heading("Seasons");
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Season", "Title", "Episodes", "Id"]);
        for season in &show.seasons {
            table.add_row(vec![
                season.number.to_string(),
                season.title.clone().unwrap_or_default(),
                if season.episodes.is_empty() {
                    "?".to_string()
                } else {
                    season.episodes.len().to_string()
                },
                season.id.clone(),
            ]);
        }
        println!("{}", table);
        out.note("Use 'streamscout episodes SEASON_ID --provider ...' for episode lists.");
    }
    Ok(())
}
