use serde::Serialize;

/// Which optional operations a provider actually implements. Callers use
/// this to hide unsupported screens instead of probing for
/// `ProviderError::Unsupported`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Capabilities {
    pub search: bool,
    pub genres: bool,
    pub people: bool,
    pub tv_shows: bool,
}

impl Capabilities {
    pub const fn full() -> Self {
        Self {
            search: true,
            genres: true,
            people: true,
            tv_shows: true,
        }
    }

    pub const fn without_people() -> Self {
        Self {
            people: false,
            ..Self::full()
        }
    }
}
