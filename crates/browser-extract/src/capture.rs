use std::time::Duration;

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::network::EventRequestWillBeSent;
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::debug;

/// One request observed at the CDP network layer.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub url: String,
    /// Request headers as the page sent them; players usually need the
    /// same Referer/Origin pair replayed.
    pub headers: Vec<(String, String)>,
}

fn is_media_url(url: &str) -> bool {
    let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
    path.ends_with(".m3u8") || path.ends_with(".mp4") || path.contains("/hls/")
}

fn headers_to_pairs(headers: &impl serde::Serialize) -> Vec<(String, String)> {
    serde_json::to_value(headers)
        .ok()
        .and_then(|value| {
            value.as_object().map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
        })
        .unwrap_or_default()
}

/// Navigate `page` to `url` and resolve with the first media request the
/// page issues, or time out. The listener is attached before navigation
/// so early requests are not lost.
pub async fn capture_media_request(
    page: &Page,
    url: &str,
    timeout: Duration,
) -> Result<CapturedRequest> {
    let mut events = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(|e| anyhow!("Failed to attach network listener: {}", e))?;

    let wait_for_media = async {
        while let Some(event) = events.next().await {
            let request_url = event.request.url.clone();
            if is_media_url(&request_url) {
                debug!(url = %request_url, "Captured media request");
                return Some(CapturedRequest {
                    url: request_url,
                    headers: headers_to_pairs(&event.request.headers),
                });
            }
        }
        None
    };

    let navigate_and_wait = async {
        page.goto(url)
            .await
            .map_err(|e| anyhow!("Navigation failed: {}", e))?;
        Ok::<_, anyhow::Error>(())
    };

    let (captured, navigated) = tokio::join!(
        tokio::time::timeout(timeout, wait_for_media),
        navigate_and_wait
    );
    navigated?;

    match captured {
        Ok(Some(request)) => Ok(request),
        Ok(None) => Err(anyhow!("Page closed before issuing a media request")),
        Err(_) => Err(anyhow!(
            "No media request observed within {:?}",
            timeout
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_media_url() {
        assert!(is_media_url("https://cdn.example/hls/master.m3u8?sig=1"));
        assert!(is_media_url("https://cdn.example/v/clip.mp4"));
        assert!(is_media_url("https://cdn.example/hls/live/token"));
        assert!(!is_media_url("https://cdn.example/player.js"));
        assert!(!is_media_url("https://cdn.example/poster.jpg"));
    }
}
