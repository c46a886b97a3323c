use std::sync::Arc;

use color_eyre::eyre::eyre;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use media_catalog_models::VideoType;
use media_catalog_providers::ProviderRegistry;

use crate::commands::provider_or_fail;
use crate::output::Output;

pub async fn episodes(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    season_id: &str,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let episodes = adapter
        .get_episodes_by_season(season_id)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&episodes).map_err(Into::into);
    }

    out.heading(format!("[{}] Season {}", provider, season_id));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Ep", "Title", "Released", "Id"]);
    for episode in &episodes {
        table.add_row(vec![
            episode.number.to_string(),
            episode.title.clone().unwrap_or_default(),
            episode
                .released
                .map(|d| d.to_string())
                .unwrap_or_default(),
            episode.id.clone(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub async fn servers(
    registry: &Arc<ProviderRegistry>,
    provider: &str,
    video_type: &VideoType,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let servers = adapter
        .get_servers(video_type)
        .await
        .map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&servers).map_err(Into::into);
    }

    if servers.is_empty() {
        out.note("No servers listed for this title.");
        return Ok(());
    }

    out.heading(format!("[{}] Servers", provider));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Status", "Embed host"]);
    for server in &servers {
        let status = if server.video.is_some() {
            "resolved"
        } else if server.embed.is_some() {
            "embed"
        } else {
            "unusable"
        };
        let host = server
            .embed
            .as_deref()
            .and_then(|url| url.split('/').nth(2))
            .unwrap_or("-");
        table.add_row(vec![server.name.clone(), status.to_string(), host.to_string()]);
    }
    println!("{}", table);
    Ok(())
}
