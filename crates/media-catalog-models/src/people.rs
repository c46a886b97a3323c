use serde::{Deserialize, Serialize};

use crate::Show;

/// Cast/crew entry. Only a handful of providers expose person pages, so
/// `filmography` is usually empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct People {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub filmography: Vec<Show>,
}

impl People {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}
