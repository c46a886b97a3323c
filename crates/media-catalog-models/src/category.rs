use serde::{Deserialize, Serialize};

use crate::Show;

/// A named, ordered row of titles on a home screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub shows: Vec<Show>,
}

impl Category {
    /// Reserved name for the hero/banner row. Providers must never emit a
    /// scraped listing block under this name; use [`Category::featured`]
    /// for the slider row instead.
    pub const FEATURED: &'static str = "featured";

    pub fn new(name: impl Into<String>, shows: Vec<Show>) -> Self {
        Self {
            name: name.into(),
            shows,
        }
    }

    pub fn featured(shows: Vec<Show>) -> Self {
        Self {
            name: Self::FEATURED.to_string(),
            shows,
        }
    }

    pub fn is_featured(&self) -> bool {
        self.name == Self::FEATURED
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Movie;

    #[test]
    fn test_featured_is_reserved_sentinel() {
        let featured = Category::featured(vec![Show::Movie(Movie::new("1", "A"))]);
        assert!(featured.is_featured());

        // A scraped row title never collides with the sentinel, even when
        // it reads similarly on the page.
        for scraped in ["Featured", "FEATURED", "Featured Movies", "Trending"] {
            let cat = Category::new(scraped, Vec::new());
            assert!(!cat.is_featured(), "{scraped} must not be the sentinel");
        }
    }
}
