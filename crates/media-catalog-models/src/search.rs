use serde::{Deserialize, Serialize};

use crate::{Genre, People, Show};

/// One search result. A blank-query search returns the provider's
/// genre/browse listing as `Genre` items instead of titles.
///
/// Externally tagged on purpose: `Show` carries its own `kind` tag, so an
/// internal tag here would collide with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SearchItem {
    Show(Show),
    Genre(Genre),
    People(People),
}

impl SearchItem {
    pub fn name(&self) -> &str {
        match self {
            SearchItem::Show(s) => s.title(),
            SearchItem::Genre(g) => &g.name,
            SearchItem::People(p) => &p.name,
        }
    }
}
