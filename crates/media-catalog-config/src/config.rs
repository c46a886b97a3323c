use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub browser: BrowserSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// User-Agent sent with every scrape. Sites fingerprint non-browser
    /// agents, so the default mimics desktop Chrome.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Server labels to try first when resolving, in order. Candidates
    /// not on the list keep the provider's order after the preferred ones.
    #[serde(default)]
    pub preferred_servers: Vec<String>,
    #[serde(default = "default_subtitle_language")]
    pub subtitle_language: String,
}

fn default_subtitle_language() -> String {
    "English".to_string()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            preferred_servers: Vec::new(),
            subtitle_language: default_subtitle_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "ProviderSettings::enabled")]
    pub hdfilmhub: ProviderSettings,
    #[serde(default = "ProviderSettings::enabled")]
    pub mirastream: ProviderSettings,
    #[serde(default = "ProviderSettings::enabled")]
    pub cineapi: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            hdfilmhub: ProviderSettings::enabled(),
            mirastream: ProviderSettings::enabled(),
            cineapi: ProviderSettings::enabled(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub enabled: bool,
    /// Override for the provider's base URL. These sites rotate domains
    /// often enough that hardcoded defaults go stale.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Explicit Chromium binary; when unset the launcher probes the
    /// system and falls back to downloading one.
    #[serde(default)]
    pub chromium_path: Option<String>,
}

fn default_headless() -> bool {
    true
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chromium_path: None,
        }
    }
}

impl Config {
    /// Load from a TOML file. A missing file yields the default config;
    /// a partial file is filled in with defaults via serde.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn provider_settings(&self, name: &str) -> Option<&ProviderSettings> {
        match name {
            "hdfilmhub" => Some(&self.providers.hdfilmhub),
            "mirastream" => Some(&self.providers.mirastream),
            "cineapi" => Some(&self.providers.cineapi),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.providers.hdfilmhub.enabled);
        assert!(config.providers.cineapi.enabled);
        assert_eq!(config.network.timeout_seconds, 30);
    }

    #[test]
    fn test_partial_file_filled_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[providers.mirastream]
enabled = false

[playback]
preferred_servers = ["Vidcloud", "Upcloud"]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.providers.mirastream.enabled);
        assert!(config.providers.hdfilmhub.enabled);
        assert_eq!(config.playback.preferred_servers, vec!["Vidcloud", "Upcloud"]);
        assert_eq!(config.playback.subtitle_language, "English");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.providers.cineapi.base_url = Some("https://api.alt.example".to_string());
        config.network.timeout_seconds = 10;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(
            loaded.providers.cineapi.base_url.as_deref(),
            Some("https://api.alt.example")
        );
        assert_eq!(loaded.network.timeout_seconds, 10);
    }
}
