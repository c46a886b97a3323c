use color_eyre::eyre::eyre;
use dialoguer::{Confirm, Input};
use media_catalog_config::{Config, PathManager};
use owo_colors::OwoColorize;

use crate::output::Output;

use crate::ConfigCommands;

pub fn run(
    cmd: &Option<ConfigCommands>,
    config: &Config,
    paths: &PathManager,
    out: &Output,
) -> color_eyre::Result<()> {
    match cmd {
        Some(ConfigCommands::Show) | None => show(config, out),
        Some(ConfigCommands::Init) => init(config, paths, out),
        Some(ConfigCommands::Path) => {
            println!("{}", paths.config_file().display());
            Ok(())
        }
    }
}

fn show(config: &Config, out: &Output) -> color_eyre::Result<()> {
    if !out.is_human() {
        return out.print_json(config).map_err(Into::into);
    }
    let rendered = toml::to_string_pretty(config).map_err(|e| eyre!("{}", e))?;
    println!("{}", rendered);
    Ok(())
}

/// Interactive wizard: which providers to enable, base-URL overrides for
/// the sites that rotate domains, and the preferred-server order.
fn init(config: &Config, paths: &PathManager, out: &Output) -> color_eyre::Result<()> {
    let mut updated = config.clone();

    println!("{}", "Streamscout configuration".bold());
    out.note("Enter accepts the value in brackets.");

    for (name, settings) in [
        ("hdfilmhub", &mut updated.providers.hdfilmhub),
        ("mirastream", &mut updated.providers.mirastream),
        ("cineapi", &mut updated.providers.cineapi),
    ] {
        settings.enabled = Confirm::new()
            .with_prompt(format!("Enable provider '{}'?", name))
            .default(settings.enabled)
            .interact()?;

        if settings.enabled {
            let current = settings.base_url.clone().unwrap_or_default();
            let url: String = Input::new()
                .with_prompt(format!("  Base URL override for {} (empty = default)", name))
                .default(current)
                .allow_empty(true)
                .interact_text()?;
            settings.base_url = if url.trim().is_empty() {
                None
            } else {
                Some(url.trim().to_string())
            };
        }
    }

    let preferred: String = Input::new()
        .with_prompt("Preferred servers, comma-separated (tried first when resolving)")
        .default(updated.playback.preferred_servers.join(", "))
        .allow_empty(true)
        .interact_text()?;
    updated.playback.preferred_servers = preferred
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    updated.browser.headless = Confirm::new()
        .with_prompt("Run the capture browser headless?")
        .default(updated.browser.headless)
        .interact()?;

    paths.ensure_directories().map_err(|e| eyre!("{}", e))?;
    updated
        .save(&paths.config_file())
        .map_err(|e| eyre!("{}", e))?;
    println!(
        "{} Configuration written to {}",
        "✓".green(),
        paths.config_file().display()
    );
    Ok(())
}
