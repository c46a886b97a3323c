use serde::{Deserialize, Serialize};

use crate::Show;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: String,
    pub name: String,
    /// Filled when the genre is used as a listing page; empty when it is
    /// just a tag on a title.
    #[serde(default)]
    pub shows: Vec<Show>,
}

impl Genre {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shows: Vec::new(),
        }
    }
}
