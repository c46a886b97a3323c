use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Genre, People, Season};

/// A catalog title. IDs are provider-scoped and opaque: the same film has
/// unrelated ids on two different providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Show {
    Movie(Movie),
    Tv(TvShow),
}

impl Show {
    pub fn id(&self) -> &str {
        match self {
            Show::Movie(m) => &m.id,
            Show::Tv(t) => &t.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Show::Movie(m) => &m.title,
            Show::Tv(t) => &t.title,
        }
    }

    pub fn poster(&self) -> Option<&str> {
        match self {
            Show::Movie(m) => m.poster.as_deref(),
            Show::Tv(t) => t.poster.as_deref(),
        }
    }

    pub fn is_movie(&self) -> bool {
        matches!(self, Show::Movie(_))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub released: Option<NaiveDate>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Quality badge as the site reports it ("HD", "CAM", ...).
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub cast: Vec<People>,
    #[serde(default)]
    pub directors: Vec<People>,
    #[serde(default)]
    pub recommendations: Vec<Show>,
}

impl Movie {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TvShow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub released: Option<NaiveDate>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub cast: Vec<People>,
    #[serde(default)]
    pub directors: Vec<People>,
    #[serde(default)]
    pub recommendations: Vec<Show>,
    /// Ordered seasons. Some providers only fill these from a separate
    /// season-list request, so an empty list does not mean "no seasons".
    #[serde(default)]
    pub seasons: Vec<Season>,
}

impl TvShow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}
