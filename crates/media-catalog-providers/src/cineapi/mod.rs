//! Adapter for the cineapi.video JSON API — the one upstream here that is
//! an actual API rather than scraped markup.

mod types;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use media_catalog_models::{
    Category, Episode, Genre, Movie, People, SearchItem, Season, Server, Show, Subtitle, TvShow,
    Video, VideoFormat, VideoType,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::capabilities::Capabilities;
use crate::error::ProviderError;
use crate::registry::ExtractorRegistry;
use crate::traits::Provider;
use types::*;

const DEFAULT_BASE_URL: &str = "https://api.cineapi.video";

pub struct CineApi {
    client: Client,
    base_url: String,
    extractors: Arc<ExtractorRegistry>,
}

impl CineApi {
    pub fn new(client: Client, base_url: Option<String>, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            extractors,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::not_found(path.to_string()));
        }
        let response = response.error_for_status()?;
        let raw = response.text().await?;
        serde_json::from_str(&raw).map_err(|e| ProviderError::parse(e.to_string()))
    }

    fn convert_show(api: ApiShow) -> Show {
        let released = api
            .release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        let genres = api
            .genres
            .into_iter()
            .map(|g| Genre::new(g.id, g.name))
            .collect();

        if api.kind == "series" {
            let mut show = TvShow::new(api.id, api.title);
            show.poster = api.poster;
            show.banner = api.backdrop;
            show.overview = api.overview;
            show.rating = api.rating;
            show.released = released;
            show.genres = genres;
            Show::Tv(show)
        } else {
            let mut movie = Movie::new(api.id, api.title);
            movie.poster = api.poster;
            movie.banner = api.backdrop;
            movie.overview = api.overview;
            movie.rating = api.rating;
            movie.released = released;
            movie.runtime = api.runtime;
            movie.genres = genres;
            Show::Movie(movie)
        }
    }

    fn convert_episode(api: ApiEpisode) -> Episode {
        let mut episode = Episode::new(api.id, api.number);
        episode.title = api.title;
        episode.overview = api.overview;
        episode.poster = api.still;
        episode.released = api
            .air_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        episode
    }

    fn convert_server(api: ApiServer) -> Server {
        let mut server = Server::new(api.id, api.label);
        if let Some(stream) = api.stream_url {
            let mut video = Video::new(&stream, VideoFormat::from_url(&stream));
            for sub in api.subtitles {
                let mut subtitle = Subtitle::new(sub.language, sub.url);
                subtitle.default = sub.default;
                video.push_subtitle(subtitle);
            }
            server = server.with_video(video);
        } else if let Some(embed) = api.embed_url {
            server = server.with_embed(embed);
        }
        server
    }
}

#[async_trait]
impl Provider for CineApi {
    fn name(&self) -> &str {
        "cineapi"
    }

    fn display_name(&self) -> &str {
        "CineAPI"
    }

    fn language(&self) -> &str {
        "en"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn get_home(&self) -> Result<Vec<Category>, ProviderError> {
        let home: ApiHome = self.get_json("/v2/home").await?;
        Ok(home
            .sections
            .into_iter()
            .filter(|s| !s.items.is_empty())
            .map(|s| {
                let shows = s.items.into_iter().map(Self::convert_show).collect();
                if s.featured {
                    Category::featured(shows)
                } else {
                    Category::new(s.label, shows)
                }
            })
            .collect())
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchItem>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            let genres: Vec<ApiGenre> = self.get_json("/v2/genres").await?;
            return Ok(genres
                .into_iter()
                .map(|g| SearchItem::Genre(Genre::new(g.id, g.name)))
                .collect());
        }

        let page: ApiSearchPage = self
            .get_json(&format!(
                "/v2/search?q={}&page={}",
                urlencoding::encode(query),
                page
            ))
            .await?;
        Ok(page
            .results
            .into_iter()
            .map(|s| SearchItem::Show(Self::convert_show(s)))
            .collect())
    }

    async fn get_movies(&self, page: u32) -> Result<Vec<Show>, ProviderError> {
        let page: ApiPage = self.get_json(&format!("/v2/movies?page={}", page)).await?;
        Ok(page.items.into_iter().map(Self::convert_show).collect())
    }

    async fn get_tv_shows(&self, page: u32) -> Result<Vec<Show>, ProviderError> {
        let page: ApiPage = self.get_json(&format!("/v2/series?page={}", page)).await?;
        Ok(page.items.into_iter().map(Self::convert_show).collect())
    }

    async fn get_movie(&self, id: &str) -> Result<Movie, ProviderError> {
        let detail: ApiMovieDetail = self.get_json(&format!("/v2/movie/{}", id)).await?;
        let mut movie = match Self::convert_show(detail.show) {
            Show::Movie(m) => m,
            Show::Tv(t) => {
                // The API occasionally mislabels; keep the metadata anyway.
                let mut m = Movie::new(t.id, t.title);
                m.poster = t.poster;
                m.overview = t.overview;
                m
            }
        };
        movie.cast = detail
            .cast
            .into_iter()
            .map(|p| {
                let mut person = People::new(p.id, p.name);
                person.image = p.image;
                person
            })
            .collect();
        movie.recommendations = detail
            .recommendations
            .into_iter()
            .map(Self::convert_show)
            .collect();
        Ok(movie)
    }

    async fn get_tv_show(&self, id: &str) -> Result<TvShow, ProviderError> {
        let detail: ApiSeriesDetail = self.get_json(&format!("/v2/series/{}", id)).await?;
        let mut show = match Self::convert_show(detail.show) {
            Show::Tv(t) => t,
            Show::Movie(m) => {
                let mut t = TvShow::new(m.id, m.title);
                t.poster = m.poster;
                t.overview = m.overview;
                t
            }
        };
        show.cast = detail
            .cast
            .into_iter()
            .map(|p| {
                let mut person = People::new(p.id, p.name);
                person.image = p.image;
                person
            })
            .collect();
        show.seasons = detail
            .seasons
            .into_iter()
            .map(|s| {
                let mut season = Season::new(s.id, s.number);
                season.title = s.title;
                season.poster = s.poster;
                season
            })
            .collect();
        Ok(show)
    }

    async fn get_episodes_by_season(
        &self,
        season_id: &str,
    ) -> Result<Vec<Episode>, ProviderError> {
        let episodes: Vec<ApiEpisode> = self
            .get_json(&format!("/v2/season/{}/episodes", season_id))
            .await?;
        Ok(episodes.into_iter().map(Self::convert_episode).collect())
    }

    async fn get_genre(&self, id: &str, page: u32) -> Result<Genre, ProviderError> {
        let genre_page: ApiGenrePage = self
            .get_json(&format!("/v2/genre/{}?page={}", id, page))
            .await?;
        let mut genre = Genre::new(id, genre_page.name);
        genre.shows = genre_page
            .items
            .into_iter()
            .map(Self::convert_show)
            .collect();
        Ok(genre)
    }

    async fn get_people(&self, id: &str, page: u32) -> Result<People, ProviderError> {
        let detail: ApiPersonDetail = self
            .get_json(&format!("/v2/person/{}?page={}", id, page))
            .await?;
        let mut person = People::new(detail.person.id, detail.person.name);
        person.image = detail.person.image;
        person.filmography = detail.credits.into_iter().map(Self::convert_show).collect();
        Ok(person)
    }

    async fn get_servers(&self, video_type: &VideoType) -> Result<Vec<Server>, ProviderError> {
        let path = match video_type {
            VideoType::Movie { id } => format!("/v2/movie/{}/servers", id),
            VideoType::Episode {
                tv_show_id,
                season,
                episode,
            } => format!(
                "/v2/series/{}/seasons/{}/episodes/{}/servers",
                tv_show_id, season, episode
            ),
        };
        let servers: Vec<ApiServer> = self.get_json(&path).await?;
        Ok(servers
            .into_iter()
            .map(Self::convert_server)
            .filter(Server::is_resolvable)
            .collect())
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> CineApi {
        CineApi::new(
            Client::new(),
            Some(base_url),
            Arc::new(ExtractorRegistry::empty()),
        )
    }

    #[tokio::test]
    async fn test_episode_triple_maps_to_server_path() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/series/srs-204/seasons/2/episodes/5/servers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                  {"id":"a","label":"Alpha","embed_url":"https://rabbitvid.net/embed-4/q1"},
                  {"id":"b","label":"Direct","stream_url":"https://cdn.cineapi.video/m/q2.m3u8",
                   "subtitles":[{"language":"English","url":"https://cdn.cineapi.video/s/en.vtt","default":true},
                                {"language":"Spanish","url":"https://cdn.cineapi.video/s/es.vtt","default":true}]},
                  {"id":"c","label":"Dead"}
                ]"#,
            ))
            .expect(1)
            .mount(&mock)
            .await;

        let provider = provider(mock.uri());
        let servers = provider
            .get_servers(&VideoType::episode("srs-204", 2, 5))
            .await
            .unwrap();

        // The unresolvable "Dead" entry is dropped.
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].embed.as_deref(), Some("https://rabbitvid.net/embed-4/q1"));

        // Pre-resolved stream: video attached, single default subtitle kept.
        let video = servers[1].video.as_ref().unwrap();
        assert_eq!(video.format, VideoFormat::Hls);
        assert_eq!(video.subtitles.iter().filter(|s| s.default).count(), 1);
        assert_eq!(video.default_subtitle().unwrap().label, "English");
    }

    #[tokio::test]
    async fn test_home_skips_empty_sections_and_maps_featured() {
        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/home"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"sections":[
                  {"label":"Spotlight","featured":true,"items":[{"id":"m1","title":"Free Guy","kind":"movie"}]},
                  {"label":"Empty","items":[]},
                  {"label":"New Series","items":[{"id":"s1","title":"Lupin","kind":"series"}]}
                ]}"#,
            ))
            .mount(&mock)
            .await;

        let provider = provider(mock.uri());
        let categories = provider.get_home().await.unwrap();

        assert_eq!(categories.len(), 2);
        assert!(categories[0].is_featured());
        assert_eq!(categories[1].name, "New Series");
        assert!(!categories[1].shows[0].is_movie());
    }
}
