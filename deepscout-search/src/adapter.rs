//! The `SearchAdapter` trait shared by all provider integrations.
//!
//! Concrete adapters implement `perform_search`; the provided `search`
//! wrapper contributes the behavior every provider shares: a timeout
//! composed with the caller's cancellation token, cancellation treated as
//! an empty-result success, and within-call deduplication by normalized
//! URL. Network and HTTP errors from `perform_search` propagate unchanged.

use crate::error::SearchError;
use crate::types::{SearchOptions, SearchResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait SearchAdapter: Send + Sync {
    /// Stable provider tag (`google`, `duckduckgo`, ...), used for source
    /// selection and result attribution.
    fn service_name(&self) -> &str;

    /// Whether this adapter is usable (credentials configured, etc.).
    /// Unavailable adapters are skipped by the aggregator.
    fn is_available(&self) -> bool {
        true
    }

    /// Provider-specific search. Implementations must not catch their own
    /// network errors; the wrapper and the aggregator own failure policy.
    async fn perform_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError>;

    /// Run a search with the shared timeout/cancellation/dedup envelope.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let name = self.service_name().to_string();
        let timeout = Duration::from_millis(options.timeout_ms);

        let timed_out = || SearchError::Timeout {
            name: name.clone(),
            timeout_ms: options.timeout_ms,
        };
        let outcome: Result<Vec<SearchResult>, SearchError> =
            if let Some(cancel) = options.cancel.clone() {
                tokio::select! {
                    _ = cancel.cancelled() => Err(SearchError::Cancelled { name: name.clone() }),
                    timed = tokio::time::timeout(timeout, self.perform_search(query, options)) => {
                        timed.unwrap_or_else(|_| Err(timed_out()))
                    }
                }
            } else {
                tokio::time::timeout(timeout, self.perform_search(query, options))
                    .await
                    .unwrap_or_else(|_| Err(timed_out()))
            };

        match outcome {
            Ok(results) => {
                let deduped = dedup_by_url(results);
                debug!(provider = %name, count = deduped.len(), "Search completed");
                Ok(deduped)
            }
            Err(err) if err.is_cancellation() => {
                warn!(provider = %name, error = %err, "Search cancelled; returning no results");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

/// Remove results sharing a normalized URL, keeping the first occurrence.
pub fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.normalized_url()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    struct FixedAdapter {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl SearchAdapter for FixedAdapter {
        fn service_name(&self) -> &str {
            "fixed"
        }

        async fn perform_search(
            &self,
            _query: &str,
            _options: &SearchOptions,
        ) -> Result<Vec<SearchResult>, SearchError> {
            Ok(self.results.clone())
        }
    }

    struct SlowAdapter;

    #[async_trait]
    impl SearchAdapter for SlowAdapter {
        fn service_name(&self) -> &str {
            "slow"
        }

        async fn perform_search(
            &self,
            _query: &str,
            _options: &SearchOptions,
        ) -> Result<Vec<SearchResult>, SearchError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    struct FailingAdapter;

    #[async_trait]
    impl SearchAdapter for FailingAdapter {
        fn service_name(&self) -> &str {
            "failing"
        }

        async fn perform_search(
            &self,
            _query: &str,
            _options: &SearchOptions,
        ) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::Provider {
                name: "failing".into(),
                message: "boom".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_search_dedups_within_call() {
        let adapter = FixedAdapter {
            results: vec![
                SearchResult::new("A", "https://example.com/page", "", "fixed"),
                SearchResult::new("B", "https://example.com/page/", "", "fixed"),
                SearchResult::new("C", "https://example.com/other", "", "fixed"),
            ],
        };
        let results = adapter
            .search("q", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_success() {
        let adapter = SlowAdapter;
        let options = SearchOptions {
            timeout_ms: 20,
            ..SearchOptions::default()
        };
        let results = adapter.search("q", &options).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_yields_empty_success() {
        let adapter = SlowAdapter;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = SearchOptions {
            cancel: Some(cancel),
            ..SearchOptions::default()
        };
        let results = adapter.search("q", &options).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let adapter = FailingAdapter;
        let result = adapter.search("q", &SearchOptions::default()).await;
        assert!(matches!(result, Err(SearchError::Provider { .. })));
    }

    #[test]
    fn test_dedup_idempotent() {
        let results = vec![
            SearchResult::new("A", "https://a.com/x", "", "s"),
            SearchResult::new("B", "https://a.com/x#frag", "", "s"),
            SearchResult::new("C", "https://b.com", "", "s"),
        ];
        let once = dedup_by_url(results);
        let twice = dedup_by_url(once.clone());
        assert_eq!(once.len(), twice.len());
        assert_eq!(once.len(), 2);
    }
}
