//! Google Custom Search adapter.
//!
//! Wraps the Custom Search JSON API. Available only when both the API key
//! and the search-engine id are configured. Categorical requests map onto
//! CSE parameters: Scholar restricts to `scholar.google.com`, News sorts
//! by date, Images switches the engine into image mode. Google returns no
//! usable score, so relevance comes from the lexical heuristic.

use crate::adapter::SearchAdapter;
use crate::error::SearchError;
use crate::relevance::lexical_relevance;
use crate::types::{SearchOptions, SearchResult, SearchType};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub struct GoogleSearchAdapter {
    client: Client,
    api_key: Option<String>,
    cse_id: Option<String>,
}

impl GoogleSearchAdapter {
    pub fn new(api_key: Option<String>, cse_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            cse_id,
        }
    }

    /// Map the response `items` array to search results.
    fn parse_items(query: &str, body: &Value) -> Vec<SearchResult> {
        let Some(items) = body.get("items").and_then(Value::as_array) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let title = item.get("title").and_then(Value::as_str)?;
                let url = item.get("link").and_then(Value::as_str)?;
                let snippet = item
                    .get("snippet")
                    .and_then(Value::as_str)
                    .unwrap_or_default();

                let mut result = SearchResult::new(title, url, snippet, "google")
                    .with_score(lexical_relevance(query, title, snippet));
                if let Some(display) = item.get("displayLink").and_then(Value::as_str) {
                    result = result.with_metadata("display_link", Value::String(display.into()));
                }
                Some(result)
            })
            .collect()
    }
}

#[async_trait]
impl SearchAdapter for GoogleSearchAdapter {
    fn service_name(&self) -> &str {
        "google"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some() && self.cse_id.is_some()
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
                name: "google".into(),
            })?;
        let cse_id = self
            .cse_id
            .as_deref()
            .ok_or_else(|| SearchError::MissingCredentials {
                name: "google".into(),
            })?;

        // CSE caps `num` at 10 per request.
        let num = options.max_results.clamp(1, 10).to_string();
        let mut request = self.client.get(ENDPOINT).query(&[
            ("key", api_key),
            ("cx", cse_id),
            ("q", query),
            ("num", num.as_str()),
        ]);

        match options.search_type {
            SearchType::Scholar => {
                request = request.query(&[("siteSearch", "scholar.google.com")]);
            }
            SearchType::News => {
                request = request.query(&[("sort", "date")]);
            }
            SearchType::Images => {
                request = request.query(&[("searchType", "image")]);
            }
            _ => {}
        }

        if let Some(site) = options
            .site_search
            .as_deref()
            .filter(|_| options.search_type != SearchType::Scholar)
        {
            request = request.query(&[("siteSearch", site)]);
        }
        if let Some(restrict) = options.date_restrict.as_deref() {
            request = request.query(&[("dateRestrict", restrict)]);
        }
        if let Some(language) = options.language.as_deref() {
            request = request.query(&[("lr", language)]);
        }
        if let Some(file_type) = options.file_type.as_deref() {
            request = request.query(&[("fileType", file_type)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(256).collect();
            return Err(SearchError::Provider {
                name: "google".into(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        let body: Value = response.json().await?;
        Ok(Self::parse_items(query, &body))
    }
}
