//! Lookup tables mapping a provider name to its adapter and an embed
//! URL's host to its extractor. Plain table dispatch; scheduling, retries
//! and caching are deliberately absent.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use media_catalog_config::Config;
use media_catalog_models::Video;
use tracing::debug;

use crate::cineapi::CineApi;
use crate::error::ProviderError;
use crate::extractors::{DoodWare, EmbedRise, MoonPlay, RabbitVid, StreamVault, VidLink, VoeScape};
use crate::hdfilmhub::HdFilmHub;
use crate::http::{build_client, build_client_no_redirect};
use crate::mirastream::MiraStream;
use crate::traits::{Extractor, Provider};

/// Ordered extractor table; the first `can_handle` match owns the URL.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// All built-in extractors. `browser_data_dir` is scratch space for
    /// the headless-browser extractor's profile.
    pub fn with_defaults(config: &Config, browser_data_dir: PathBuf) -> Self {
        let client = build_client(&config.network);
        let no_redirect = build_client_no_redirect(&config.network);

        let mut registry = Self::empty();
        registry.register(Arc::new(VoeScape::new(no_redirect)));
        registry.register(Arc::new(RabbitVid::new(client.clone())));
        registry.register(Arc::new(VidLink::new(client.clone())));
        registry.register(Arc::new(MoonPlay::new(client.clone())));
        registry.register(Arc::new(StreamVault::new(client.clone())));
        registry.register(Arc::new(DoodWare::new(client)));
        registry.register(Arc::new(EmbedRise::new(
            config.browser.clone(),
            browser_data_dir,
        )));
        registry
    }

    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    pub fn find(&self, url: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.iter().find(|e| e.can_handle(url))
    }

    /// Dispatch `url` to its extractor. Unknown hosts are a hard
    /// `Unsupported` so callers can move on to the next server.
    pub async fn extract(&self, url: &str) -> Result<Video, ProviderError> {
        let extractor = self
            .find(url)
            .ok_or(ProviderError::Unsupported("no extractor for this host"))?;
        debug!(extractor = extractor.name(), url, "Dispatching embed link");
        extractor.extract(url).await
    }

    pub fn names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }
}

/// Name-keyed provider table built from configuration; only enabled
/// providers are constructed. BTreeMap keeps iteration deterministic for
/// aggregation output.
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &Config, browser_data_dir: PathBuf) -> Self {
        let extractors = Arc::new(ExtractorRegistry::with_defaults(config, browser_data_dir));
        let client = build_client(&config.network);

        let mut registry = Self::empty();

        if config.providers.hdfilmhub.enabled {
            registry.register(Arc::new(HdFilmHub::new(
                client.clone(),
                config.providers.hdfilmhub.base_url.clone(),
                Arc::clone(&extractors),
            )));
        }
        if config.providers.mirastream.enabled {
            registry.register(Arc::new(MiraStream::new(
                client.clone(),
                config.providers.mirastream.base_url.clone(),
                Arc::clone(&extractors),
            )));
        }
        if config.providers.cineapi.enabled {
            registry.register(Arc::new(CineApi::new(
                client,
                config.providers.cineapi.base_url.clone(),
                Arc::clone(&extractors),
            )));
        }

        registry
    }

    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(|k| k.as_str()).collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use media_catalog_config::NetworkConfig;

    fn default_extractors() -> ExtractorRegistry {
        ExtractorRegistry::with_defaults(&Config::default(), std::env::temp_dir())
    }

    #[test]
    fn test_extractor_dispatch_by_host() {
        let registry = default_extractors();

        assert_eq!(
            registry.find("https://voescape.net/e/abc").unwrap().name(),
            "voescape"
        );
        assert_eq!(
            registry
                .find("https://rabbitvid.net/embed-4/xyz")
                .unwrap()
                .name(),
            "rabbitvid"
        );
        assert_eq!(
            registry.find("https://streamvault.cc/v/q1").unwrap().name(),
            "streamvault"
        );
        assert!(registry.find("https://unknown-host.example/e/1").is_none());
    }

    #[tokio::test]
    async fn test_extract_unknown_host_is_unsupported() {
        let registry = default_extractors();
        let err = registry
            .extract("https://unknown-host.example/e/1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[test]
    fn test_provider_registry_honors_enabled_flags() {
        let mut config = Config::default();
        config.providers.mirastream.enabled = false;

        let registry = ProviderRegistry::from_config(&config, std::env::temp_dir());
        assert_eq!(registry.names(), vec!["cineapi", "hdfilmhub"]);
        assert!(registry.get("mirastream").is_none());
    }

    #[test]
    fn test_provider_base_url_override() {
        let mut config = Config::default();
        config.providers.hdfilmhub.base_url = Some("https://hdfilmhub.alt".to_string());

        let registry = ProviderRegistry::from_config(&config, std::env::temp_dir());
        assert_eq!(
            registry.get("hdfilmhub").unwrap().base_url(),
            "https://hdfilmhub.alt"
        );
    }

    #[test]
    fn test_first_can_handle_match_wins() {
        // Two extractors claiming the same host: registration order decides.
        let mut registry = ExtractorRegistry::empty();
        let client = build_client(&NetworkConfig::default());
        registry.register(Arc::new(crate::extractors::RabbitVid::new(client.clone())));
        registry.register(Arc::new(crate::extractors::VidLink::new(client)));

        // rabbitvid also answers for rbtcloud URLs even though vidlink
        // would accept a vlcdn URL later in the table.
        assert_eq!(
            registry
                .find("https://rbtcloud.to/embed-4/abc")
                .unwrap()
                .name(),
            "rabbitvid"
        );
        assert_eq!(
            registry.find("https://vlcdn.net/e/abc").unwrap().name(),
            "vidlink"
        );
    }
}
