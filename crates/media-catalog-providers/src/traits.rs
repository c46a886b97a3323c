use async_trait::async_trait;
use media_catalog_models::{
    Category, Episode, Genre, Movie, People, SearchItem, Server, Show, TvShow, Video, VideoType,
};

use crate::capabilities::Capabilities;
use crate::error::ProviderError;

/// A site-specific catalog adapter.
///
/// Every method is an independent scrape of the upstream site; there is no
/// shared state between calls beyond whatever session cache an individual
/// adapter keeps for itself. Listing-style methods degrade to an empty
/// collection when a section of the page fails to parse, and only fail
/// outright when the whole request does.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registry key; lowercase, stable across releases.
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Primary content language ("en", "fr", ...).
    fn language(&self) -> &str;

    fn base_url(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Parse the landing page into named rows in page order. A hero/banner
    /// slider becomes the reserved [`Category::FEATURED`] row. Rows whose
    /// item list came back empty are skipped here, not by callers.
    async fn get_home(&self) -> Result<Vec<Category>, ProviderError>;

    /// Paginated search. A blank query returns the site's genre/browse
    /// listing (as `SearchItem::Genre`) so the caller can build a
    /// browse-by-genre screen without a separate contract method.
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchItem>, ProviderError>;

    async fn get_movies(&self, page: u32) -> Result<Vec<Show>, ProviderError>;

    async fn get_tv_shows(&self, page: u32) -> Result<Vec<Show>, ProviderError>;

    async fn get_movie(&self, id: &str) -> Result<Movie, ProviderError>;

    /// Detail page including the season list; episodes inside each season
    /// may be left empty and fetched via [`Provider::get_episodes_by_season`].
    async fn get_tv_show(&self, id: &str) -> Result<TvShow, ProviderError>;

    async fn get_episodes_by_season(&self, season_id: &str)
        -> Result<Vec<Episode>, ProviderError>;

    async fn get_genre(&self, id: &str, page: u32) -> Result<Genre, ProviderError>;

    /// Cast filmography. Most sites have no person pages.
    async fn get_people(&self, _id: &str, _page: u32) -> Result<People, ProviderError> {
        Err(ProviderError::Unsupported("person pages"))
    }

    /// Locate playback candidates for a title. For
    /// [`VideoType::Episode`], the (tv_show_id, season, episode) triple
    /// fully determines the request this method issues.
    async fn get_servers(&self, video_type: &VideoType) -> Result<Vec<Server>, ProviderError>;

    /// Resolve one candidate into a playable video, usually by handing its
    /// embed URL to the extractor registry.
    async fn get_video(&self, server: &Server) -> Result<Video, ProviderError>;
}

/// A host-specific link resolver: one embed/redirect URL in, one playable
/// [`Video`] out.
///
/// The declared contract is that resolving the same link twice yields an
/// equivalent playable source, but hosts built on single-use tokens can
/// violate that — callers therefore invoke `extract` at most once per
/// user action and never retry it.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    /// Host-substring match deciding whether this extractor owns the URL.
    fn can_handle(&self, url: &str) -> bool;

    async fn extract(&self, url: &str) -> Result<Video, ProviderError>;
}
