use thiserror::Error;

/// Deliberately coarse error taxonomy. These sites break silently and
/// often; callers either skip the failing source (listings, servers) or
/// surface the message as-is (detail lookups). There is no retry policy.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The page or payload did not have the expected shape — usually the
    /// site changed its markup.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not supported: {0}")]
    Unsupported(&'static str),

    /// Every candidate server failed to resolve to a playable video.
    #[error("extraction failed: {0}")]
    Extractor(String),
}

impl ProviderError {
    pub fn parse(message: impl Into<String>) -> Self {
        ProviderError::Parse(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ProviderError::NotFound(message.into())
    }

    pub fn extractor(message: impl Into<String>) -> Self {
        ProviderError::Extractor(message.into())
    }
}
