use std::sync::Arc;

use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use media_catalog_providers::ProviderRegistry;
use serde_json::json;

use crate::output::Output;

pub fn run(registry: &Arc<ProviderRegistry>, out: &Output) -> color_eyre::Result<()> {
    if !out.is_human() {
        let listing: Vec<_> = registry
            .all()
            .map(|p| {
                json!({
                    "name": p.name(),
                    "display_name": p.display_name(),
                    "language": p.language(),
                    "base_url": p.base_url(),
                    "capabilities": p.capabilities(),
                })
            })
            .collect();
        return out.print_json(&listing).map_err(Into::into);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Display", "Lang", "Base URL", "Search", "Genres", "People"]);
    for provider in registry.all() {
        let caps = provider.capabilities();
        let flag = |b: bool| if b { "yes" } else { "-" };
        table.add_row(vec![
            provider.name().to_string(),
            provider.display_name().to_string(),
            provider.language().to_string(),
            provider.base_url().to_string(),
            flag(caps.search).to_string(),
            flag(caps.genres).to_string(),
            flag(caps.people).to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
