//! embedrise.com assembles its stream URL inside a heavily obfuscated
//! player bundle that defeats static scraping. Instead of chasing the
//! bundle, load the page in headless Chromium and lift the first media
//! request the player makes off the CDP network layer.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use browser_extract::{capture_media_request, launch_browser, LaunchOptions};
use media_catalog_config::BrowserSettings;
use tracing::warn;

use crate::error::ProviderError;
use crate::traits::Extractor;
use media_catalog_models::{Video, VideoFormat};

const CAPTURE_TIMEOUT: Duration = Duration::from_secs(25);

pub struct EmbedRise {
    settings: BrowserSettings,
    data_dir: PathBuf,
}

impl EmbedRise {
    pub fn new(settings: BrowserSettings, data_dir: PathBuf) -> Self {
        Self { settings, data_dir }
    }
}

#[async_trait]
impl Extractor for EmbedRise {
    fn name(&self) -> &str {
        "embedrise"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("embedrise.")
    }

    async fn extract(&self, url: &str) -> Result<Video, ProviderError> {
        let options = LaunchOptions {
            headless: self.settings.headless,
            chromium_path: self.settings.chromium_path.as_ref().map(PathBuf::from),
            data_dir: self.data_dir.clone(),
        };

        let handle = launch_browser(&options)
            .await
            .map_err(|e| ProviderError::extractor(e.to_string()))?;

        let result = async {
            let page = handle
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProviderError::extractor(e.to_string()))?;
            capture_media_request(&page, url, CAPTURE_TIMEOUT)
                .await
                .map_err(|e| ProviderError::extractor(e.to_string()))
        }
        .await;

        handle.shutdown().await;

        let captured = result?;
        if captured.headers.is_empty() {
            warn!(url = %captured.url, "Captured media request carried no headers");
        }

        let mut video = Video::new(&captured.url, VideoFormat::from_url(&captured.url));
        for (name, value) in captured.headers {
            // Hop-by-hop and CDP pseudo headers are useless to a player.
            if name.starts_with(':') || name.eq_ignore_ascii_case("host") {
                continue;
            }
            video = video.with_header(name, value);
        }
        Ok(video)
    }
}
