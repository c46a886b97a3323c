use serde::{Deserialize, Serialize};

use crate::Episode;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Season {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    /// Ordered episodes; empty when the provider fetches them lazily via
    /// `get_episodes_by_season`.
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn new(id: impl Into<String>, number: u32) -> Self {
        Self {
            id: id.into(),
            number,
            ..Default::default()
        }
    }
}
