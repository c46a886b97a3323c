pub mod browse;
pub mod config;
pub mod detail;
pub mod home;
pub mod providers;
pub mod resolve;
pub mod search;
pub mod servers;

use color_eyre::eyre::eyre;
use media_catalog_providers::{Provider, ProviderRegistry};
use std::sync::Arc;

/// Look a provider up by name or fail with the list of valid names.
pub fn provider_or_fail(
    registry: &ProviderRegistry,
    name: &str,
) -> color_eyre::Result<Arc<dyn Provider>> {
    registry.get(name).ok_or_else(|| {
        eyre!(
            "Unknown provider '{}'. Registered providers: {}",
            name,
            registry.names().join(", ")
        )
    })
}
