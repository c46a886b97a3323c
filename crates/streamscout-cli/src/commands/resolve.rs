use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::eyre;
use indicatif::{ProgressBar, ProgressStyle};
use media_catalog_config::Config;
use media_catalog_core::Resolver;
use media_catalog_models::VideoType;
use media_catalog_providers::ProviderRegistry;

use crate::commands::provider_or_fail;
use crate::output::{print_video, Output};

pub async fn run(
    registry: &Arc<ProviderRegistry>,
    config: &Config,
    provider: &str,
    video_type: &VideoType,
    server: Option<&str>,
    out: &Output,
) -> color_eyre::Result<()> {
    let adapter = provider_or_fail(registry, provider)?;
    let resolver = Resolver::new(&config.playback);

    let spinner = if out.is_human() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .expect("static template is valid"),
        );
        spinner.set_message(format!("Resolving via {}...", provider));
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    } else {
        None
    };

    let result = resolver.resolve(adapter.as_ref(), video_type, server).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let resolved = result.map_err(|e| eyre!("{}: {}", provider, e))?;

    if !out.is_human() {
        return out.print_json(&resolved).map_err(Into::into);
    }
    print_video(&resolved.video, &resolved.server);
    Ok(())
}
