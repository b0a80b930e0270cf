//! Tavily adapter.
//!
//! Single POST to `/search`. Tavily scores its own results, so the
//! provider score is passed through unchanged.

use crate::adapter::SearchAdapter;
use crate::error::SearchError;
use crate::types::{SearchOptions, SearchResult, SearchType};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

const ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    topic: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
    include_domains: Vec<String>,
    exclude_domains: Vec<String>,
}

pub struct TavilyAdapter {
    client: Client,
    api_key: Option<String>,
    search_depth: String,
}

impl TavilyAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            search_depth: "basic".to_string(),
        }
    }

    /// Use `advanced` search depth instead of the default `basic`.
    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }

    fn topic_for(search_type: SearchType) -> &'static str {
        match search_type {
            SearchType::News => "news",
            _ => "general",
        }
    }

    fn parse_results(body: &Value) -> Vec<SearchResult> {
        let Some(items) = body.get("results").and_then(Value::as_array) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let title = item.get("title").and_then(Value::as_str)?;
                let url = item.get("url").and_then(Value::as_str)?;
                let snippet = item
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let score = item
                    .get("score")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.5);

                let mut result =
                    SearchResult::new(title, url, snippet, "tavily").with_score(score);
                if let Some(published) = item.get("published_date").and_then(Value::as_str) {
                    result =
                        result.with_metadata("published_date", Value::String(published.into()));
                }
                Some(result)
            })
            .collect()
    }
}

#[async_trait]
impl SearchAdapter for TavilyAdapter {
    fn service_name(&self) -> &str {
        "tavily"
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
                name: "tavily".into(),
            })?;

        let include_domains = options
            .site_search
            .as_ref()
            .map(|site| vec![site.clone()])
            .unwrap_or_default();

        let request = TavilyRequest {
            query,
            search_depth: &self.search_depth,
            topic: Self::topic_for(options.search_type),
            max_results: options.max_results,
            include_answer: false,
            include_raw_content: false,
            include_images: options.search_type == SearchType::Images,
            include_domains,
            exclude_domains: Vec::new(),
        };

        let response = self
            .client
            .post(ENDPOINT)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(256).collect();
            return Err(SearchError::Provider {
                name: "tavily".into(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_results(&body))
    }
}
