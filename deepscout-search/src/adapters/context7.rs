//! Context7 documentation adapter.
//!
//! Resolve-then-fetch: resolve the best-matching library id for the query,
//! then fetch its documentation for the topic under a token budget.
//! Always registered; the backend needs no credentials.

use crate::adapter::SearchAdapter;
use crate::error::SearchError;
use crate::types::{SearchOptions, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://context7.com/api/v1";

/// Token budget for a single documentation fetch.
const DOC_TOKEN_BUDGET: usize = 4_000;

pub struct Context7Adapter {
    client: Client,
    base_url: String,
}

impl Context7Adapter {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Pick the library id with the best match for the query.
    fn parse_library_id(body: &Value) -> Option<String> {
        body.get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|first| first.get("id"))
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Split the query into a library name (first token) and topic (rest).
    ///
    /// "tokio channels backpressure" resolves the `tokio` docs and fetches
    /// the "channels backpressure" topic.
    fn split_query(query: &str) -> (String, String) {
        let mut words = query.split_whitespace();
        let library = words.next().unwrap_or(query).to_string();
        let topic = words.collect::<Vec<_>>().join(" ");
        (library, topic)
    }

    async fn resolve_library(&self, library: &str) -> Result<Option<String>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", library)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Provider {
                name: "context7".into(),
                message: format!("resolve failed: HTTP {}", response.status()),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_library_id(&body))
    }

    async fn fetch_docs(&self, library_id: &str, topic: &str) -> Result<String, SearchError> {
        let id = library_id.trim_start_matches('/');
        let url = format!("{}/{}", self.base_url, id);
        let tokens = DOC_TOKEN_BUDGET.to_string();
        let mut request = self.client.get(&url).query(&[("tokens", tokens.as_str())]);
        if !topic.is_empty() {
            request = request.query(&[("topic", topic)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Provider {
                name: "context7".into(),
                message: format!("doc fetch failed: HTTP {}", response.status()),
            });
        }

        Ok(response.text().await?)
    }
}

impl Default for Context7Adapter {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SearchAdapter for Context7Adapter {
    fn service_name(&self) -> &str {
        "context7"
    }

    async fn perform_search(
        &self,
        query: &str,
        _options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let (library, topic) = Self::split_query(query);

        let Some(library_id) = self.resolve_library(&library).await? else {
            debug!(library, "Context7 found no matching library");
            return Ok(Vec::new());
        };

        let docs = self.fetch_docs(&library_id, &topic).await?;
        if docs.trim().is_empty() {
            return Ok(Vec::new());
        }

        let snippet: String = docs.chars().take(1_500).collect();
        let title = if topic.is_empty() {
            format!("{library} documentation")
        } else {
            format!("{library} documentation: {topic}")
        };
        let url = format!("https://context7.com{library_id}");

        Ok(vec![SearchResult::new(title, url, snippet, "context7")
            .with_score(0.85)
            .with_metadata("library_id", Value::String(library_id))])
    }
}
