//! French-language adapter for mirastream.
//!
//! The portal domain 302s to whichever mirror is currently live; the AJAX
//! endpoints want the session cookie plus an X-CSRF-TOKEN header scraped
//! from the landing page. Markup here is flat enough that regexes beat a
//! DOM walk.

mod session;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use media_catalog_models::{
    Category, Episode, Genre, Movie, SearchItem, Season, Server, Show, TvShow, Video, VideoType,
};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::capabilities::Capabilities;
use crate::error::ProviderError;
use crate::registry::ExtractorRegistry;
use crate::traits::Provider;
use crate::util::trailing_id;

pub use session::{Session, SessionCache};

const DEFAULT_PORTAL_URL: &str = "https://mirastream.cc";

pub struct MiraStream {
    client: Client,
    portal_url: String,
    session: SessionCache,
    extractors: Arc<ExtractorRegistry>,
}

#[derive(Debug, Deserialize)]
struct AjaxSearchItem {
    id: String,
    titre: String,
    #[serde(default)]
    affiche: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct AjaxServer {
    nom: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct AjaxSeason {
    id: String,
    numero: u32,
    #[serde(default)]
    episodes: Vec<AjaxEpisode>,
}

#[derive(Debug, Deserialize)]
struct AjaxEpisode {
    id: String,
    numero: u32,
    #[serde(default)]
    titre: Option<String>,
}

fn card_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?s)<a class="card" href="/((?:film|serie)/[^"]+)"[^>]*>\s*<img src="([^"]+)"[^>]*>\s*<span class="card-title">([^<]+)</span>"#,
        )
        .unwrap()
    })
}

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<section class="strip" data-label="([^"]+)">(.*?)</section>"#).unwrap()
    })
}

fn csrf_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<meta name="csrf-token" content="([^"]+)""#).unwrap())
}

fn genre_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="/genre/([a-z0-9-]+)"[^>]*>([^<]+)<"#).unwrap())
}

fn parse_cards(html: &str) -> Vec<Show> {
    card_re()
        .captures_iter(html)
        .map(|caps| {
            let id = caps[1].to_string();
            let poster = Some(caps[2].to_string());
            let title = caps[3].trim().to_string();
            if id.starts_with("serie/") {
                let mut show = TvShow::new(id, title);
                show.poster = poster;
                Show::Tv(show)
            } else {
                let mut movie = Movie::new(id, title);
                movie.poster = poster;
                Show::Movie(movie)
            }
        })
        .collect()
}

impl MiraStream {
    pub fn new(client: Client, portal_url: Option<String>, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            client,
            portal_url: portal_url.unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string()),
            session: SessionCache::new(),
            extractors,
        }
    }

    /// Hit the portal, follow the mirror redirect, and collect cookie +
    /// CSRF token from the landing page.
    async fn establish_session(&self) -> Result<Session, ProviderError> {
        let response = self.client.get(&self.portal_url).send().await?;

        let cookie = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ");

        let final_url = response.url().clone();
        let mut base_url = format!(
            "{}://{}",
            final_url.scheme(),
            final_url.host_str().unwrap_or_default()
        );
        if let Some(port) = final_url.port() {
            base_url.push_str(&format!(":{port}"));
        }

        let html = response.text().await?;
        let csrf_token = csrf_re()
            .captures(&html)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| ProviderError::parse("landing page has no csrf-token meta"))?;

        debug!(provider = "mirastream", mirror = %base_url, "Established scrape session");
        Ok(Session {
            base_url,
            cookie,
            csrf_token,
        })
    }

    async fn session(&self) -> Result<Session, ProviderError> {
        self.session
            .get_or_init(|| self.establish_session())
            .await
    }

    async fn fetch_page(&self, path: &str) -> Result<String, ProviderError> {
        let session = self.session().await?;
        let response = self
            .client
            .get(format!("{}{}", session.base_url, path))
            .header(reqwest::header::COOKIE, &session.cookie)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// AJAX GET with session headers. A 403 means the cookie or token
    /// rotated: invalidate once and replay with a fresh session.
    async fn fetch_ajax(&self, path: &str) -> Result<String, ProviderError> {
        for attempt in 0..2 {
            let session = self.session().await?;
            let response = self
                .client
                .get(format!("{}{}", session.base_url, path))
                .header(reqwest::header::COOKIE, &session.cookie)
                .header("X-CSRF-TOKEN", &session.csrf_token)
                .header("X-Requested-With", "XMLHttpRequest")
                .send()
                .await?;

            if response.status() == reqwest::StatusCode::FORBIDDEN && attempt == 0 {
                debug!(provider = "mirastream", path, "Session rejected, refreshing");
                self.session.invalidate().await;
                continue;
            }
            let response = response.error_for_status()?;
            return Ok(response.text().await?);
        }
        unreachable!("second attempt either returned or failed with an error")
    }

    fn parse_genres_from(html: &str) -> Vec<Genre> {
        let mut genres: Vec<Genre> = Vec::new();
        for caps in genre_link_re().captures_iter(html) {
            let id = caps[1].to_string();
            if genres.iter().any(|g| g.id == id) {
                continue;
            }
            genres.push(Genre::new(id, caps[2].trim()));
        }
        genres
    }
}

#[async_trait]
impl Provider for MiraStream {
    fn name(&self) -> &str {
        "mirastream"
    }

    fn display_name(&self) -> &str {
        "MiraStream"
    }

    fn language(&self) -> &str {
        "fr"
    }

    fn base_url(&self) -> &str {
        &self.portal_url
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::without_people()
    }

    async fn get_home(&self) -> Result<Vec<Category>, ProviderError> {
        let html = self.fetch_page("/").await?;
        let mut categories = Vec::new();
        for caps in strip_re().captures_iter(&html) {
            let name = caps[1].trim().to_string();
            let shows = parse_cards(&caps[2]);
            if shows.is_empty() {
                continue;
            }
            categories.push(Category::new(name, shows));
        }
        Ok(categories)
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchItem>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            let html = self.fetch_page("/").await?;
            return Ok(Self::parse_genres_from(&html)
                .into_iter()
                .map(SearchItem::Genre)
                .collect());
        }

        let raw = self
            .fetch_ajax(&format!(
                "/ajax/recherche?q={}&page={}",
                urlencoding::encode(query),
                page
            ))
            .await?;
        let items: Vec<AjaxSearchItem> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::parse(e.to_string()))?;

        Ok(items
            .into_iter()
            .map(|item| {
                let show = if item.kind == "serie" {
                    let mut show = TvShow::new(item.id, item.titre);
                    show.poster = item.affiche;
                    Show::Tv(show)
                } else {
                    let mut movie = Movie::new(item.id, item.titre);
                    movie.poster = item.affiche;
                    Show::Movie(movie)
                };
                SearchItem::Show(show)
            })
            .collect())
    }

    async fn get_movies(&self, page: u32) -> Result<Vec<Show>, ProviderError> {
        let html = self.fetch_page(&format!("/films/page/{}", page)).await?;
        Ok(parse_cards(&html))
    }

    async fn get_tv_shows(&self, page: u32) -> Result<Vec<Show>, ProviderError> {
        let html = self.fetch_page(&format!("/series/page/{}", page)).await?;
        Ok(parse_cards(&html))
    }

    async fn get_movie(&self, id: &str) -> Result<Movie, ProviderError> {
        let html = self.fetch_page(&format!("/{}", id)).await?;
        parse_movie_detail(&html, id)
    }

    async fn get_tv_show(&self, id: &str) -> Result<TvShow, ProviderError> {
        let html = self.fetch_page(&format!("/{}", id)).await?;
        parse_tv_detail(&html, id)
    }

    async fn get_episodes_by_season(
        &self,
        season_id: &str,
    ) -> Result<Vec<Episode>, ProviderError> {
        let raw = self.fetch_ajax(&format!("/ajax/saison/{}", season_id)).await?;
        let episodes: Vec<AjaxEpisode> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::parse(e.to_string()))?;
        Ok(episodes
            .into_iter()
            .map(|e| {
                let mut episode = Episode::new(e.id, e.numero);
                episode.title = e.titre;
                episode
            })
            .collect())
    }

    async fn get_genre(&self, id: &str, page: u32) -> Result<Genre, ProviderError> {
        let html = self
            .fetch_page(&format!("/genre/{}/page/{}", id, page))
            .await?;
        let mut genre = Genre::new(id, id.replace('-', " "));
        genre.shows = parse_cards(&html);
        Ok(genre)
    }

    async fn get_servers(&self, video_type: &VideoType) -> Result<Vec<Server>, ProviderError> {
        let path = match video_type {
            VideoType::Movie { id } => {
                let num = trailing_id(id)
                    .ok_or_else(|| ProviderError::parse(format!("malformed movie id: {id}")))?;
                format!("/ajax/lecteurs/{}", num)
            }
            VideoType::Episode {
                tv_show_id,
                season,
                episode,
            } => {
                let num = trailing_id(tv_show_id)
                    .ok_or_else(|| ProviderError::parse(format!("malformed show id: {tv_show_id}")))?;
                format!("/ajax/lecteurs/{}/{}/{}", num, season, episode)
            }
        };

        let raw = self.fetch_ajax(&path).await?;
        let servers: Vec<AjaxServer> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::parse(e.to_string()))?;

        Ok(servers
            .into_iter()
            .enumerate()
            .map(|(i, s)| Server::new((i + 1).to_string(), s.nom).with_embed(s.url))
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
        match self.extractors.extract(embed).await {
            Ok(video) => Ok(video),
            Err(e) => {
                warn!(provider = "mirastream", server = %server.name, error = %e, "Extraction failed");
                Err(e)
            }
        }
    }
}

fn detail_re(field: &str) -> Regex {
    Regex::new(&format!(
        r#"(?s)<(?:div|h1|p) class="{field}"[^>]*>(.*?)</(?:div|h1|p)>"#
    ))
    .unwrap()
}

fn parse_movie_detail(html: &str, id: &str) -> Result<Movie, ProviderError> {
    let title = detail_re("fiche-titre")
        .captures(html)
        .map(|c| crate::util::clean_text(&c[1]))
        .ok_or_else(|| ProviderError::parse("detail page has no title"))?;

    let mut movie = Movie::new(id, title);
    movie.overview = detail_re("synopsis")
        .captures(html)
        .map(|c| crate::util::clean_text(&strip_tags(&c[1])))
        .filter(|s| !s.is_empty());
    movie.genres = MiraStream::parse_genres_from(html);

    static POSTER_RE: OnceLock<Regex> = OnceLock::new();
    movie.poster = POSTER_RE
        .get_or_init(|| Regex::new(r#"<img class="fiche-affiche" src="([^"]+)""#).unwrap())
        .captures(html)
        .map(|c| c[1].to_string());

    Ok(movie)
}

fn parse_tv_detail(html: &str, id: &str) -> Result<TvShow, ProviderError> {
    let movie = parse_movie_detail(html, id)?;
    let mut show = TvShow::new(movie.id, movie.title);
    show.overview = movie.overview;
    show.poster = movie.poster;
    show.genres = movie.genres;

    // Seasons ship as an embedded JSON blob rather than markup.
    static SAISONS_RE: OnceLock<Regex> = OnceLock::new();
    let raw = SAISONS_RE
        .get_or_init(|| Regex::new(r#"window\.__SAISONS__\s*=\s*(\[.*?\]);"#).unwrap())
        .captures(html)
        .map(|c| c[1].to_string())
        .ok_or_else(|| ProviderError::parse("serie page has no season data"))?;

    let seasons: Vec<AjaxSeason> =
        serde_json::from_str(&raw).map_err(|e| ProviderError::parse(e.to_string()))?;
    show.seasons = seasons
        .into_iter()
        .map(|s| {
            let mut season = Season::new(s.id, s.numero);
            season.episodes = s
                .episodes
                .into_iter()
                .map(|e| {
                    let mut episode = Episode::new(e.id, e.numero);
                    episode.title = e.titre;
                    episode
                })
                .collect();
            season
        })
        .collect();
    Ok(show)
}

fn strip_tags(html: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE
        .get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
        .replace_all(html, " ")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cards() {
        let html = r#"
<a class="card" href="/film/annette-881">
  <img src="https://img.example/a.jpg" alt="">
  <span class="card-title">Annette</span>
</a>
<a class="card" href="/serie/lupin-204">
  <img src="https://img.example/l.jpg" alt="">
  <span class="card-title">Lupin</span>
</a>"#;
        let shows = parse_cards(html);
        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].id(), "film/annette-881");
        assert!(shows[0].is_movie());
        assert!(!shows[1].is_movie());
    }

    #[test]
    fn test_parse_tv_detail_with_embedded_seasons() {
        let html = r#"
<h1 class="fiche-titre">Lupin</h1>
<div class="synopsis"><p>Un gentleman cambrioleur.</p></div>
<script>
window.__SAISONS__ = [{"id":"s-204-1","numero":1,"episodes":[{"id":"e-204-1-1","numero":1,"titre":"Chapitre 1"}]}];
</script>"#;
        let show = parse_tv_detail(html, "serie/lupin-204").unwrap();
        assert_eq!(show.title, "Lupin");
        assert_eq!(show.overview.as_deref(), Some("Un gentleman cambrioleur."));
        assert_eq!(show.seasons.len(), 1);
        assert_eq!(show.seasons[0].episodes[0].title.as_deref(), Some("Chapitre 1"));
    }

    #[tokio::test]
    async fn test_ajax_session_refresh_on_403() {
        use wiremock::matchers::{header_exists, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "sid=abc; Path=/")
                    .set_body_string(r#"<meta name="csrf-token" content="tok-1">"#),
            )
            .mount(&mock)
            .await;

        // First AJAX hit is rejected, second (after refresh) succeeds.
        Mock::given(method("GET"))
            .and(path("/ajax/lecteurs/881"))
            .and(header_exists("X-CSRF-TOKEN"))
            .respond_with(ResponseTemplate::new(403))
            .up_to_n_times(1)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/lecteurs/881"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"nom":"Lecteur VF","url":"https://voescape.net/e/fr1"}]"#,
            ))
            .mount(&mock)
            .await;

        let provider = MiraStream::new(
            Client::new(),
            Some(mock.uri()),
            Arc::new(ExtractorRegistry::empty()),
        );
        let servers = provider
            .get_servers(&VideoType::movie("film/annette-881"))
            .await
            .unwrap();

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "Lecteur VF");
        assert!(servers[0].is_resolvable());
    }
}
