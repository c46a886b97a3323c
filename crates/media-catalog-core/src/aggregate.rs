//! Cross-provider fan-out for the home and search screens. Requests run
//! concurrently per provider and failures isolate to the provider that
//! broke; there is no coordination beyond joining the futures.

use std::sync::Arc;

use futures::future::join_all;
use media_catalog_models::{Category, SearchItem};
use media_catalog_providers::ProviderRegistry;
use serde::Serialize;
use tracing::warn;

/// One home-screen row, tagged with the provider it came from. Rows keep
/// each provider's own category order.
#[derive(Debug, Clone, Serialize)]
pub struct HomeRow {
    pub provider: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderResults {
    pub provider: String,
    pub items: Vec<SearchItem>,
}

pub struct Aggregator {
    registry: Arc<ProviderRegistry>,
}

impl Aggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Fetch every provider's home screen concurrently. Providers that
    /// error are skipped with a warning; their rows simply don't appear.
    /// Categories are not re-filtered here — providers already drop
    /// empty listing blocks themselves.
    pub async fn home(&self) -> Vec<HomeRow> {
        let fetches = self.registry.all().map(|provider| {
            let provider = Arc::clone(provider);
            async move {
                let name = provider.name().to_string();
                (name, provider.get_home().await)
            }
        });

        let mut rows = Vec::new();
        for (provider, result) in join_all(fetches).await {
            match result {
                Ok(categories) => {
                    rows.extend(categories.into_iter().map(|category| HomeRow {
                        provider: provider.clone(),
                        category,
                    }));
                }
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Skipping provider home screen");
                }
            }
        }
        rows
    }

    /// Fan the query out to every provider. Empty result sets are kept
    /// (an empty list is an answer); failed providers are dropped.
    pub async fn search(&self, query: &str, page: u32) -> Vec<ProviderResults> {
        let query = query.to_string();
        let fetches = self.registry.all().map(|provider| {
            let provider = Arc::clone(provider);
            let query = query.clone();
            async move {
                let name = provider.name().to_string();
                (name, provider.search(&query, page).await)
            }
        });

        let mut results = Vec::new();
        for (provider, result) in join_all(fetches).await {
            match result {
                Ok(items) => results.push(ProviderResults { provider, items }),
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Skipping provider search results");
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockProvider;
    use media_catalog_models::{Movie, Show};

    fn category(name: &str, titles: &[&str]) -> Category {
        Category::new(
            name,
            titles
                .iter()
                .map(|t| Show::Movie(Movie::new(t.to_lowercase(), *t)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_home_preserves_category_order_and_keeps_all_rows() {
        let mut registry = ProviderRegistry::empty();
        registry.register(Arc::new(MockProvider::with_categories(
            "alpha",
            vec![
                Category::featured(vec![Show::Movie(Movie::new("m1", "Hero"))]),
                category("Trending", &["A", "B"]),
                category("Latest", &["C"]),
            ],
        )));

        let aggregator = Aggregator::new(Arc::new(registry));
        let rows = aggregator.home().await;

        // Order is exactly what the provider returned, nothing dropped.
        assert_eq!(rows.len(), 3);
        assert!(rows[0].category.is_featured());
        assert_eq!(rows[1].category.name, "Trending");
        assert_eq!(rows[2].category.name, "Latest");
        assert_eq!(rows[1].category.shows.len(), 2);
    }

    #[tokio::test]
    async fn test_home_skips_failed_providers() {
        let mut registry = ProviderRegistry::empty();
        registry.register(Arc::new(MockProvider::with_categories(
            "alpha",
            vec![category("Trending", &["A"])],
        )));
        registry.register(Arc::new(MockProvider::failing("beta")));

        let aggregator = Aggregator::new(Arc::new(registry));
        let rows = aggregator.home().await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].provider, "alpha");
    }

    #[tokio::test]
    async fn test_search_keeps_empty_answers_drops_failures() {
        let mut registry = ProviderRegistry::empty();
        registry.register(Arc::new(MockProvider::with_categories(
            "alpha",
            vec![category("Trending", &["Free Guy"])],
        )));
        registry.register(Arc::new(MockProvider::with_categories("beta", vec![])));
        registry.register(Arc::new(MockProvider::failing("gamma")));

        let aggregator = Aggregator::new(Arc::new(registry));
        let results = aggregator.search("free", 1).await;

        assert_eq!(results.len(), 2);
        // BTreeMap registry: deterministic provider order.
        assert_eq!(results[0].provider, "alpha");
        assert_eq!(results[0].items.len(), 1);
        assert_eq!(results[1].provider, "beta");
        assert!(results[1].items.is_empty());
    }
}
