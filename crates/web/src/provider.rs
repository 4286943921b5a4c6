//! Search provider trait and the soft-failing search client built on it.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::types::{SearchError, SearchResult};

/// Trait for implementing search providers.
///
/// Providers report failures as `SearchError`; [`SearchClient`] decides what
/// to do with them.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search, returning at most `num_results` results in
    /// engine-ranked order.
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}

/// Search client that never fails.
///
/// A provider error becomes an empty result list and a warning.
#[derive(Clone)]
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Search a single query.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        tracing::debug!("Searching {} for: {}", self.provider.name(), query);

        match self.provider.search(query, limit).await {
            Ok(mut results) => {
                results.truncate(limit);
                tracing::info!(
                    "{} returned {} results for: {}",
                    self.provider.name(),
                    results.len(),
                    query
                );
                results
            }
            Err(e) => {
                tracing::warn!("Search failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Search every query and merge the results.
    ///
    /// Queries run in priority order. Results are merged round-robin by rank
    /// (every query's first hit, then every query's second hit, ...), exact
    /// repeats of a URL are skipped and the merged list is cut to `limit`.
    pub async fn search_all(&self, queries: &[String], limit: usize) -> Vec<SearchResult> {
        let mut per_query = Vec::with_capacity(queries.len());
        for query in queries {
            per_query.push(self.search(query, limit).await);
        }

        merge_round_robin(per_query, limit)
    }
}

fn merge_round_robin(per_query: Vec<Vec<SearchResult>>, limit: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    let mut iterators: Vec<_> = per_query.into_iter().map(Vec::into_iter).collect();

    loop {
        let mut progressed = false;
        for results in iterators.iter_mut() {
            if merged.len() >= limit {
                return merged;
            }
            if let Some(result) = results.next() {
                progressed = true;
                if seen.insert(result.url.clone()) {
                    merged.push(result);
                }
            }
        }
        if !progressed {
            return merged;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockProvider {
        responses: HashMap<String, Vec<SearchResult>>,
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        async fn search(
            &self,
            query: &str,
            num_results: usize,
        ) -> Result<Vec<SearchResult>, SearchError> {
            match self.responses.get(query) {
                Some(results) => Ok(results.iter().take(num_results).cloned().collect()),
                None => Err(SearchError::Status { status: 503 }),
            }
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn result(url: &str) -> SearchResult {
        SearchResult::new(format!("Title {}", url), url, format!("Snippet {}", url))
    }

    fn client(responses: Vec<(&str, Vec<SearchResult>)>) -> SearchClient {
        let responses = responses
            .into_iter()
            .map(|(q, r)| (q.to_string(), r))
            .collect();
        SearchClient::new(Arc::new(MockProvider { responses }))
    }

    #[tokio::test]
    async fn test_search_failure_returns_empty() {
        let client = client(vec![]);
        let results = client.search("anything", 5).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let client = client(vec![(
            "q",
            vec![result("https://a.com"), result("https://b.com"), result("https://c.com")],
        )]);
        assert_eq!(client.search("q", 2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_search_all_merges_round_robin() {
        let client = client(vec![
            ("first", vec![result("https://a.com"), result("https://b.com")]),
            ("second", vec![result("https://c.com"), result("https://a.com"), result("https://d.com")]),
        ]);

        let queries = vec!["first".to_string(), "second".to_string()];
        let results = client.search_all(&queries, 10).await;
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();

        assert_eq!(
            urls,
            vec!["https://a.com", "https://c.com", "https://b.com", "https://d.com"]
        );
    }

    #[tokio::test]
    async fn test_search_all_skips_failed_queries() {
        let client = client(vec![("works", vec![result("https://a.com")])]);
        let queries = vec!["broken".to_string(), "works".to_string()];

        let results = client.search_all(&queries, 5).await;
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_merge_stops_at_limit() {
        let merged = merge_round_robin(
            vec![
                vec![result("https://a.com"), result("https://b.com")],
                vec![result("https://c.com"), result("https://d.com")],
            ],
            3,
        );
        assert_eq!(merged.len(), 3);
    }
}
