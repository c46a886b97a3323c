use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tracing::{error, info, warn};
use which::which;

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Explicit Chromium binary; probed/fetched when unset.
    pub chromium_path: Option<PathBuf>,
    /// Profile + download scratch space; also where a fetched Chromium
    /// build lands.
    pub data_dir: PathBuf,
}

/// A launched browser plus the handler task pumping its CDP messages.
/// Close the browser before dropping the handle so the task can end.
pub struct BrowserHandle {
    pub browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserHandle {
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

fn find_system_chromium() -> Option<PathBuf> {
    which("chromium")
        .or_else(|_| which("chromium-browser"))
        .or_else(|_| which("google-chrome"))
        .or_else(|_| which("google-chrome-stable"))
        .ok()
}

async fn fetch_chromium(data_dir: &Path) -> Result<PathBuf> {
    info!("No system Chromium found, downloading via BrowserFetcher...");
    let download_path = data_dir.join("chromium_downloads");
    tokio::fs::create_dir_all(&download_path).await?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&download_path)
            .build()
            .map_err(|e| anyhow!("Failed to create BrowserFetcherOptions: {}", e))?,
    );

    let info = fetcher
        .fetch()
        .await
        .map_err(|e| anyhow!("Failed to fetch Chromium: {}", e))?;
    info!("Chromium downloaded to: {:?}", info.executable_path);
    Ok(info.executable_path)
}

fn build_config(options: &LaunchOptions, chrome_path: PathBuf) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .user_data_dir(options.data_dir.join("profile"))
        .window_size(1280, 720)
        .arg("--no-first-run")
        .arg("--disable-gpu")
        .arg("--mute-audio")
        .arg("--autoplay-policy=no-user-gesture-required");

    if !options.headless {
        builder = builder.with_head();
    }

    builder
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

/// Launch Chromium and spawn the CDP handler task. Mirrors the usual
/// lifecycle: probe the system, fall back to a fetched build, then keep
/// pumping handler messages until the browser goes away or the error
/// budget is spent.
pub async fn launch_browser(options: &LaunchOptions) -> Result<BrowserHandle> {
    let chrome_path = match &options.chromium_path {
        Some(path) => path.clone(),
        None => match find_system_chromium() {
            Some(path) => path,
            None => fetch_chromium(&options.data_dir).await?,
        },
    };

    let config = build_config(options, chrome_path)?;
    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

    let handler_task = tokio::spawn(async move {
        let mut error_count = 0;
        const MAX_ERRORS: usize = 10;

        while let Some(message) = handler.next().await {
            match message {
                Ok(_) => {
                    error_count = 0;
                }
                Err(e) => {
                    error_count += 1;
                    warn!(
                        "Browser handler error (count: {}/{}): {:?}",
                        error_count, MAX_ERRORS, e
                    );
                    if error_count >= MAX_ERRORS {
                        error!(
                            "Browser handler received {} consecutive errors. Browser process may have crashed.",
                            error_count
                        );
                        break;
                    }
                }
            }
        }
    });

    Ok(BrowserHandle {
        browser,
        handler_task,
    })
}
