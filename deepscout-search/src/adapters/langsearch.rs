//! LangSearch adapter.
//!
//! Routes to a category-specific endpoint based on the requested search
//! type and passes the provider's `relevance_score` through unchanged.

use crate::adapter::SearchAdapter;
use crate::error::SearchError;
use crate::types::{SearchOptions, SearchResult, SearchType};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "https://api.langsearch.com";

pub struct LangSearchAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LangSearchAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the endpoint base, e.g. for a self-hosted deployment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Endpoint path for a search category.
    fn path_for(search_type: SearchType) -> &'static str {
        match search_type {
            SearchType::Scholar => "/v1/scholar-search",
            SearchType::News => "/v1/news-search",
            SearchType::Code => "/v1/code-search",
            SearchType::Documentation => "/v1/doc-search",
            SearchType::Web | SearchType::Images => "/v1/web-search",
        }
    }

    fn parse_results(body: &Value) -> Vec<SearchResult> {
        // Results live under data.webPages.value in the web shape, or
        // directly under "results" for the categorical endpoints.
        let items = body
            .get("data")
            .and_then(|d| d.get("webPages"))
            .and_then(|w| w.get("value"))
            .and_then(Value::as_array)
            .or_else(|| body.get("results").and_then(Value::as_array));

        let Some(items) = items else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let title = item
                    .get("name")
                    .or_else(|| item.get("title"))
                    .and_then(Value::as_str)?;
                let url = item
                    .get("url")
                    .or_else(|| item.get("link"))
                    .and_then(Value::as_str)?;
                let snippet = item
                    .get("snippet")
                    .or_else(|| item.get("summary"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let score = item
                    .get("relevance_score")
                    .or_else(|| item.get("relevanceScore"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.5);

                Some(SearchResult::new(title, url, snippet, "langsearch").with_score(score))
            })
            .collect()
    }
}

#[async_trait]
impl SearchAdapter for LangSearchAdapter {
    fn service_name(&self) -> &str {
        "langsearch"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn perform_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::MissingCredentials {
                name: "langsearch".into(),
            })?;

        let url = format!("{}{}", self.base_url, Self::path_for(options.search_type));
        let mut body = json!({
            "query": query,
            "count": options.max_results,
        });
        if let Some(freshness) = options.date_restrict.as_deref() {
            body["freshness"] = Value::String(freshness.into());
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(256).collect();
            return Err(SearchError::Provider {
                name: "langsearch".into(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_results(&body))
    }
}
