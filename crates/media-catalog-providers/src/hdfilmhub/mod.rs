//! HTML catalog adapter for hdfilmhub.to.
//!
//! Catalog pages are server-rendered; seasons, episodes and server lists
//! come from the site's own `/ajax/*` endpoints, and each server's embed
//! link sits behind one more JSON hop.

mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use media_catalog_models::{
    Category, Episode, Genre, Movie, SearchItem, Server, Show, TvShow, Video, VideoType,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::capabilities::Capabilities;
use crate::error::ProviderError;
use crate::registry::ExtractorRegistry;
use crate::traits::Provider;
use crate::util::trailing_id;

const DEFAULT_BASE_URL: &str = "https://hdfilmhub.to";

pub struct HdFilmHub {
    client: Client,
    base_url: String,
    extractors: Arc<ExtractorRegistry>,
}

/// `/ajax/episode/sources/{id}` response.
#[derive(Debug, Deserialize)]
struct SourcesResponse {
    #[serde(rename = "type")]
    kind: String,
    link: String,
}

impl HdFilmHub {
    pub fn new(client: Client, base_url: Option<String>, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            extractors,
        }
    }

    async fn fetch(&self, path: &str) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Resolve one server's `data-id` to its embed link. Hops through the
    /// sources JSON endpoint; only `iframe` entries carry a usable link.
    async fn fetch_embed(&self, server_id: &str) -> Result<String, ProviderError> {
        let raw = self
            .fetch(&format!("/ajax/episode/sources/{}", server_id))
            .await?;
        let sources: SourcesResponse =
            serde_json::from_str(&raw).map_err(|e| ProviderError::parse(e.to_string()))?;
        if sources.kind != "iframe" {
            return Err(ProviderError::parse(format!(
                "unexpected source type: {}",
                sources.kind
            )));
        }
        Ok(sources.link)
    }

    /// Fan out the embed-link hop for every listed server and keep the
    /// ones that resolve. Order is the page's own server order.
    async fn build_servers(&self, entries: Vec<(String, String)>) -> Vec<Server> {
        let lookups = entries.into_iter().map(|(id, name)| async move {
            match self.fetch_embed(&id).await {
                Ok(link) => Some(Server::new(id, name).with_embed(link)),
                Err(e) => {
                    warn!(provider = "hdfilmhub", server = %name, error = %e, "Skipping server with unresolvable embed link");
                    None
                }
            }
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn find_episode_id(
        &self,
        tv_show_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<String, ProviderError> {
        let show_num = trailing_id(tv_show_id)
            .ok_or_else(|| ProviderError::parse(format!("malformed show id: {tv_show_id}")))?;

        let seasons_html = self.fetch(&format!("/ajax/season/list/{}", show_num)).await?;
        let seasons = parser::parse_seasons(&seasons_html)?;
        let season = seasons
            .into_iter()
            .find(|s| s.number == season)
            .ok_or_else(|| ProviderError::not_found(format!("season {season} of {tv_show_id}")))?;

        let episodes_html = self
            .fetch(&format!("/ajax/season/episodes/{}", season.id))
            .await?;
        let episodes = parser::parse_episodes(&episodes_html)?;
        episodes
            .into_iter()
            .find(|e| e.number == episode)
            .map(|e| e.id)
            .ok_or_else(|| {
                ProviderError::not_found(format!("episode {episode} of season {}", season.number))
            })
    }
}

#[async_trait]
impl Provider for HdFilmHub {
    fn name(&self) -> &str {
        "hdfilmhub"
    }

    fn display_name(&self) -> &str {
        "HD Film Hub"
    }

    fn language(&self) -> &str {
        "en"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::without_people()
    }

    async fn get_home(&self) -> Result<Vec<Category>, ProviderError> {
        let html = self.fetch("/home").await?;
        parser::parse_home(&html)
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchItem>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            let html = self.fetch("/home").await?;
            return Ok(parser::parse_genres(&html)?
                .into_iter()
                .map(SearchItem::Genre)
                .collect());
        }

        let slug = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        let html = self
            .fetch(&format!("/search/{}?page={}", urlencoding::encode(&slug), page))
            .await?;
        Ok(parser::parse_listing(&html)?
            .into_iter()
            .map(SearchItem::Show)
            .collect())
    }

    async fn get_movies(&self, page: u32) -> Result<Vec<Show>, ProviderError> {
        let html = self.fetch(&format!("/movie?page={}", page)).await?;
        parser::parse_listing(&html)
    }

    async fn get_tv_shows(&self, page: u32) -> Result<Vec<Show>, ProviderError> {
        let html = self.fetch(&format!("/tv-show?page={}", page)).await?;
        parser::parse_listing(&html)
    }

    async fn get_movie(&self, id: &str) -> Result<Movie, ProviderError> {
        let html = self.fetch(&format!("/{}", id)).await?;
        parser::parse_movie_detail(&html, id)
    }

    async fn get_tv_show(&self, id: &str) -> Result<TvShow, ProviderError> {
        let html = self.fetch(&format!("/{}", id)).await?;
        let mut show = parser::parse_tv_detail(&html, id)?;

        let show_num = trailing_id(id)
            .ok_or_else(|| ProviderError::parse(format!("malformed show id: {id}")))?;
        let seasons_html = self.fetch(&format!("/ajax/season/list/{}", show_num)).await?;
        show.seasons = parser::parse_seasons(&seasons_html)?;
        Ok(show)
    }

    async fn get_episodes_by_season(
        &self,
        season_id: &str,
    ) -> Result<Vec<Episode>, ProviderError> {
        let html = self
            .fetch(&format!("/ajax/season/episodes/{}", season_id))
            .await?;
        parser::parse_episodes(&html)
    }

    async fn get_genre(&self, id: &str, page: u32) -> Result<Genre, ProviderError> {
        let html = self.fetch(&format!("/genre/{}?page={}", id, page)).await?;
        let shows = parser::parse_listing(&html)?;
        let mut genre = Genre::new(id, humanize_slug(id));
        genre.shows = shows;
        Ok(genre)
    }

    async fn get_servers(&self, video_type: &VideoType) -> Result<Vec<Server>, ProviderError> {
        let list_html = match video_type {
            VideoType::Movie { id } => {
                let movie_num = trailing_id(id)
                    .ok_or_else(|| ProviderError::parse(format!("malformed movie id: {id}")))?;
                self.fetch(&format!("/ajax/episode/list/{}", movie_num)).await?
            }
            VideoType::Episode {
                tv_show_id,
                season,
                episode,
            } => {
                let episode_id = self.find_episode_id(tv_show_id, *season, *episode).await?;
                self.fetch(&format!("/ajax/episode/servers/{}", episode_id))
                    .await?
            }
        };

        let entries = parser::parse_servers(&list_html)?;
        Ok(self.build_servers(entries).await)
    }

    async fn get_video(&self, server: &Server) -> Result<Video, ProviderError> {
        if let Some(video) = &server.video {
            return Ok(video.clone());
        }
        let embed = server
            .embed
            .as_deref()
            .ok_or_else(|| ProviderError::extractor("server carries no embed link"))?;
        self.extractors.extract(embed).await
    }
}

fn humanize_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ExtractorRegistry;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> HdFilmHub {
        HdFilmHub::new(
            Client::new(),
            Some(base_url),
            Arc::new(ExtractorRegistry::empty()),
        )
    }

    const SEASONS: &str = r#"<a class="dropdown-item" data-id="310">Season 1</a>
<a class="dropdown-item" data-id="311">Season 2</a>"#;
    const EPISODES: &str = r#"<li class="eps-item" data-id="9005">
<h3 class="film-name"><a title="Eps 5: Journey Into Mystery"></a></h3></li>"#;
    const SERVERS: &str = r#"<li class="link-item" data-id="771"><span>Vidcloud</span></li>"#;

    #[tokio::test]
    async fn test_episode_triple_determines_server_request() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ajax/season/list/39540"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEASONS))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/season/episodes/311"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EPISODES))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/episode/servers/9005"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SERVERS))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/episode/sources/771"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"type":"iframe","link":"https://voescape.net/e/abc123"}"#,
            ))
            .expect(1)
            .mount(&mock)
            .await;

        let provider = provider(mock.uri());
        let servers = provider
            .get_servers(&VideoType::episode("tv/watch-loki-39540", 2, 5))
            .await
            .unwrap();

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "Vidcloud");
        assert_eq!(
            servers[0].embed.as_deref(),
            Some("https://voescape.net/e/abc123")
        );
        assert!(servers[0].is_resolvable());
    }

    #[tokio::test]
    async fn test_movie_servers_skip_failed_source_hops() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ajax/episode/list/19921"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<li class="link-item" data-id="1"><span>Good</span></li>
<li class="link-item" data-id="2"><span>Broken</span></li>"#,
            ))
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/episode/sources/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"type":"iframe","link":"https://rabbitvid.net/embed-4/xyz"}"#,
            ))
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/episode/sources/2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock)
            .await;

        let provider = provider(mock.uri());
        let servers = provider
            .get_servers(&VideoType::movie("movie/watch-free-guy-19921"))
            .await
            .unwrap();

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "Good");
    }

    #[tokio::test]
    async fn test_search_builds_slug_url() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/free-guy"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="flw-item">
<h3 class="film-name"><a href="/movie/watch-free-guy-19921" title="Free Guy"></a></h3>
</div>"#,
            ))
            .expect(1)
            .mount(&mock)
            .await;

        let provider = provider(mock.uri());
        let results = provider.search("Free Guy", 2).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name(), "Free Guy");
    }
}
