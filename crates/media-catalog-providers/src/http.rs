use std::time::Duration;

use media_catalog_config::NetworkConfig;
use reqwest::Client;

/// Create a reqwest Client with browser-like headers; sites behind
/// Cloudflare reject obvious non-browser agents.
pub fn build_client(network: &NetworkConfig) -> Client {
    Client::builder()
        .user_agent(&network.user_agent)
        .timeout(Duration::from_secs(network.timeout_seconds))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Variant that never follows redirects, for extractors that read the
/// Location chain themselves.
pub fn build_client_no_redirect(network: &NetworkConfig) -> Client {
    Client::builder()
        .user_agent(&network.user_agent)
        .timeout(Duration::from_secs(network.timeout_seconds))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|_| Client::new())
}
