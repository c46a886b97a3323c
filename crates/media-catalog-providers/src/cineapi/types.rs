use serde::Deserialize;

/// Wire types for the cineapi.video JSON endpoints. The API is
/// undocumented; fields mirror what the Android client of the site is
/// observed to receive, everything optional unless listings break
/// without it.
#[derive(Debug, Deserialize)]
pub struct ApiShow {
    pub id: String,
    pub title: String,
    /// "movie" | "series"
    pub kind: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub backdrop: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<ApiGenre>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGenre {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiHome {
    pub sections: Vec<ApiSection>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSection {
    pub label: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub items: Vec<ApiShow>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub items: Vec<ApiShow>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSearchPage {
    #[serde(default)]
    pub results: Vec<ApiShow>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSeriesDetail {
    #[serde(flatten)]
    pub show: ApiShow,
    #[serde(default)]
    pub cast: Vec<ApiPerson>,
    #[serde(default)]
    pub seasons: Vec<ApiSeason>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMovieDetail {
    #[serde(flatten)]
    pub show: ApiShow,
    #[serde(default)]
    pub cast: Vec<ApiPerson>,
    #[serde(default)]
    pub recommendations: Vec<ApiShow>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPerson {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPersonDetail {
    #[serde(flatten)]
    pub person: ApiPerson,
    #[serde(default)]
    pub credits: Vec<ApiShow>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSeason {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiEpisode {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub still: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiServer {
    pub id: String,
    pub label: String,
    /// Embed page an extractor has to chase.
    #[serde(default)]
    pub embed_url: Option<String>,
    /// Some servers hand out the final stream directly.
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub subtitles: Vec<ApiSubtitle>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSubtitle {
    pub language: String,
    pub url: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiGenrePage {
    pub name: String,
    #[serde(default)]
    pub items: Vec<ApiShow>,
}
