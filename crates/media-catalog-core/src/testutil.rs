//! Canned providers for contract-level tests.

use async_trait::async_trait;
use media_catalog_models::{
    Category, Episode, Genre, Movie, People, SearchItem, Server, Show, TvShow, Video, VideoType,
};
use media_catalog_providers::{Capabilities, Provider, ProviderError};

pub struct MockProvider {
    pub name: &'static str,
    pub categories: Vec<Category>,
    pub servers: Vec<Server>,
    /// Every call fails when set, simulating a dead mirror.
    pub fail: bool,
}

impl MockProvider {
    pub fn with_categories(name: &'static str, categories: Vec<Category>) -> Self {
        Self {
            name,
            categories,
            servers: Vec::new(),
            fail: false,
        }
    }

    pub fn with_servers(name: &'static str, servers: Vec<Server>) -> Self {
        Self {
            name,
            categories: Vec::new(),
            servers,
            fail: false,
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            categories: Vec::new(),
            servers: Vec::new(),
            fail: true,
        }
    }

    fn check(&self) -> Result<(), ProviderError> {
        if self.fail {
            Err(ProviderError::parse("mock failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn display_name(&self) -> &str {
        self.name
    }

    fn language(&self) -> &str {
        "en"
    }

    fn base_url(&self) -> &str {
        "https://mock.example"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn get_home(&self) -> Result<Vec<Category>, ProviderError> {
        self.check()?;
        Ok(self.categories.clone())
    }

    async fn search(&self, query: &str, _page: u32) -> Result<Vec<SearchItem>, ProviderError> {
        self.check()?;
        if query.is_empty() {
            return Ok(vec![SearchItem::Genre(Genre::new("action", "Action"))]);
        }
        Ok(self
            .categories
            .iter()
            .flat_map(|c| c.shows.iter())
            .filter(|s| s.title().to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .map(SearchItem::Show)
            .collect())
    }

    async fn get_movies(&self, _page: u32) -> Result<Vec<Show>, ProviderError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_tv_shows(&self, _page: u32) -> Result<Vec<Show>, ProviderError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_movie(&self, id: &str) -> Result<Movie, ProviderError> {
        self.check()?;
        Ok(Movie::new(id, "Mock Movie"))
    }

    async fn get_tv_show(&self, id: &str) -> Result<TvShow, ProviderError> {
        self.check()?;
        Ok(TvShow::new(id, "Mock Show"))
    }

    async fn get_episodes_by_season(
        &self,
        _season_id: &str,
    ) -> Result<Vec<Episode>, ProviderError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_genre(&self, id: &str, _page: u32) -> Result<Genre, ProviderError> {
        self.check()?;
        Ok(Genre::new(id, id))
    }

    async fn get_people(&self, id: &str, _page: u32) -> Result<People, ProviderError> {
        self.check()?;
        Ok(People::new(id, "Mock Person"))
    }

    async fn get_servers(&self, _video_type: &VideoType) -> Result<Vec<Server>, ProviderError> {
        self.check()?;
        Ok(self.servers.clone())
    }

    async fn get_video(&self, server: &Server) -> Result<Video, ProviderError> {
        self.check()?;
        server
            .video
            .clone()
            .ok_or_else(|| ProviderError::extractor(format!("{} has no stream", server.name)))
    }
}
