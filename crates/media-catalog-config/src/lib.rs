pub mod config;
pub mod paths;

pub use config::{
    BrowserSettings, Config, NetworkConfig, PlaybackConfig, ProviderSettings, ProvidersConfig,
    default_user_agent,
};
pub use paths::{PathManager, container_base_path};
