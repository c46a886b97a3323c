//! Server-to-video resolution: order the candidates, try them in turn,
//! first success wins. A failing server is skipped, never retried — some
//! hosts hand out single-use tokens, so a second call on the same server
//! is not safe.

use media_catalog_config::PlaybackConfig;
use media_catalog_models::{Server, Video, VideoType};
use media_catalog_providers::{Provider, ProviderError};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedVideo {
    /// Display name of the server that produced the stream.
    pub server: String,
    pub video: Video,
}

pub struct Resolver {
    preferred_servers: Vec<String>,
}

impl Resolver {
    pub fn new(playback: &PlaybackConfig) -> Self {
        Self {
            preferred_servers: playback.preferred_servers.clone(),
        }
    }

    /// Stable preference ordering: servers named in the preference list
    /// come first, in list order; everything else keeps the provider's
    /// own order behind them.
    pub fn order_servers(&self, servers: Vec<Server>) -> Vec<Server> {
        if self.preferred_servers.is_empty() {
            return servers;
        }

        let mut remaining: Vec<Option<Server>> = servers.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(remaining.len());

        for preferred in &self.preferred_servers {
            for slot in remaining.iter_mut() {
                if slot
                    .as_ref()
                    .is_some_and(|s| s.name.eq_ignore_ascii_case(preferred))
                {
                    ordered.push(slot.take().expect("slot checked above"));
                }
            }
        }
        ordered.extend(remaining.into_iter().flatten());
        ordered
    }

    /// Full pipeline for one title: list servers, optionally narrow to a
    /// requested server, then walk the candidates until one resolves.
    pub async fn resolve(
        &self,
        provider: &dyn Provider,
        video_type: &VideoType,
        server_name: Option<&str>,
    ) -> Result<ResolvedVideo, ProviderError> {
        let mut servers = provider.get_servers(video_type).await?;

        if let Some(wanted) = server_name {
            servers.retain(|s| s.name.eq_ignore_ascii_case(wanted) || s.id == wanted);
            if servers.is_empty() {
                return Err(ProviderError::not_found(format!(
                    "no server named '{wanted}'"
                )));
            }
        }

        let servers = self.order_servers(servers);
        if servers.is_empty() {
            return Err(ProviderError::not_found("no servers listed for title"));
        }

        let total = servers.len();
        let mut failures = 0;
        for server in servers {
            if !server.is_resolvable() {
                warn!(server = %server.name, "Skipping server with neither embed nor video");
                failures += 1;
                continue;
            }
            match provider.get_video(&server).await {
                Ok(mut video) => {
                    enforce_single_default_subtitle(&mut video);
                    info!(server = %server.name, source = %video.source, "Resolved stream");
                    return Ok(ResolvedVideo {
                        server: server.name,
                        video,
                    });
                }
                Err(e) => {
                    warn!(server = %server.name, error = %e, "Server failed to resolve, moving on");
                    failures += 1;
                }
            }
        }

        Err(ProviderError::extractor(format!(
            "all {failures} of {total} servers failed"
        )))
    }
}

/// Extractors build subtitle lists straight from scraped payloads, so the
/// at-most-one-default invariant is re-asserted after every resolution:
/// the first default wins.
pub fn enforce_single_default_subtitle(video: &mut Video) {
    let mut seen_default = false;
    for subtitle in &mut video.subtitles {
        if subtitle.default {
            if seen_default {
                subtitle.default = false;
            } else {
                seen_default = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockProvider;
    use media_catalog_models::{Subtitle, VideoFormat};

    fn direct_server(name: &str, url: &str) -> Server {
        Server::new(name.to_lowercase(), name)
            .with_video(Video::new(url, VideoFormat::from_url(url)))
    }

    #[test]
    fn test_order_servers_preference_is_stable() {
        let resolver = Resolver {
            preferred_servers: vec!["Upcloud".to_string(), "Vidcloud".to_string()],
        };
        let servers = vec![
            Server::new("1", "Vidcloud"),
            Server::new("2", "Doodware"),
            Server::new("3", "Upcloud"),
            Server::new("4", "Moonplay"),
        ];

        let names: Vec<String> = resolver
            .order_servers(servers)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Upcloud", "Vidcloud", "Doodware", "Moonplay"]);
    }

    #[tokio::test]
    async fn test_resolve_skips_failures_and_takes_first_success() {
        // First candidate has no stream (its get_video fails), second works.
        let provider = MockProvider::with_servers(
            "alpha",
            vec![
                Server::new("1", "Broken").with_embed("https://dead.example/e/1"),
                direct_server("Direct", "https://cdn.example/master.m3u8"),
            ],
        );

        let resolver = Resolver {
            preferred_servers: Vec::new(),
        };
        let resolved = resolver
            .resolve(&provider, &VideoType::movie("m1"), None)
            .await
            .unwrap();

        assert_eq!(resolved.server, "Direct");
        assert_eq!(resolved.video.source, "https://cdn.example/master.m3u8");
    }

    #[tokio::test]
    async fn test_resolve_all_failures_is_extractor_error() {
        let provider = MockProvider::with_servers(
            "alpha",
            vec![
                Server::new("1", "Broken").with_embed("https://dead.example/e/1"),
                Server::new("2", "Bare"),
            ],
        );

        let resolver = Resolver {
            preferred_servers: Vec::new(),
        };
        let err = resolver
            .resolve(&provider, &VideoType::movie("m1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Extractor(_)));
    }

    #[tokio::test]
    async fn test_resolve_unknown_server_name_is_not_found() {
        let provider = MockProvider::with_servers(
            "alpha",
            vec![direct_server("Direct", "https://cdn.example/master.m3u8")],
        );

        let resolver = Resolver {
            preferred_servers: Vec::new(),
        };
        let err = resolver
            .resolve(&provider, &VideoType::movie("m1"), Some("Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolved_video_has_single_default_subtitle() {
        let mut video = Video::new("https://cdn.example/master.m3u8", VideoFormat::Hls);
        // Bypass push_subtitle to simulate an extractor that built the
        // list directly from a scraped payload.
        video.subtitles = vec![
            Subtitle {
                label: "English".into(),
                file: "https://c/en.vtt".into(),
                default: true,
            },
            Subtitle {
                label: "German".into(),
                file: "https://c/de.vtt".into(),
                default: true,
            },
        ];
        let provider = MockProvider::with_servers(
            "alpha",
            vec![Server::new("1", "Direct").with_video(video)],
        );

        let resolver = Resolver {
            preferred_servers: Vec::new(),
        };
        let resolved = resolver
            .resolve(&provider, &VideoType::movie("m1"), None)
            .await
            .unwrap();

        let defaults: Vec<&str> = resolved
            .video
            .subtitles
            .iter()
            .filter(|s| s.default)
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(defaults, vec!["English"]);
    }
}
