//! DuckDuckGo adapter: keyless, always available.
//!
//! Three-stage strategy: the instant-answer JSON endpoint first; if it
//! yields nothing, scrape the standard HTML endpoint; if that also fails,
//! fall back to the lite endpoint. Relevance comes from the lexical
//! heuristic since DuckDuckGo exposes no score.

use crate::adapter::SearchAdapter;
use crate::error::SearchError;
use crate::relevance::lexical_relevance;
use crate::types::{SearchOptions, SearchResult};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

const INSTANT_ANSWER_URL: &str = "https://api.duckduckgo.com/";
const HTML_URL: &str = "https://html.duckduckgo.com/html/";
const LITE_URL: &str = "https://lite.duckduckgo.com/lite/";

const SOURCE: &str = "duckduckgo";

fn html_result_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
            .expect("static regex")
    })
}

fn html_snippet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#).expect("static regex")
    })
}

fn lite_result_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*rel="nofollow"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
            .expect("static regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex"))
}

/// Strip tags and decode the entities DuckDuckGo markup actually uses.
fn clean_html(fragment: &str) -> String {
    let text = tag_regex().replace_all(fragment, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// Resolve DuckDuckGo redirect links (`/l/?uddg=<encoded>`) to the target URL.
fn resolve_redirect(href: &str) -> String {
    if let Some(idx) = href.find("uddg=") {
        let encoded = &href[idx + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    if let Some(stripped) = href.strip_prefix("//") {
        return format!("https://{stripped}");
    }
    href.to_string()
}

pub struct DuckDuckGoAdapter {
    client: Client,
}

impl DuckDuckGoAdapter {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Extract results from the instant-answer payload: abstract, direct
    /// answer, definition, and related topics (including nested groups).
    fn parse_instant_answer(query: &str, body: &Value, max_results: usize) -> Vec<SearchResult> {
        let mut results = Vec::new();

        let abstract_text = body
            .get("AbstractText")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !abstract_text.is_empty() {
            let title = body
                .get("Heading")
                .and_then(Value::as_str)
                .filter(|h| !h.is_empty())
                .unwrap_or(query);
            let url = body
                .get("AbstractURL")
                .and_then(Value::as_str)
                .unwrap_or_default();
            results.push(
                SearchResult::new(title, url, abstract_text, SOURCE)
                    .with_score(lexical_relevance(query, title, abstract_text)),
            );
        }

        let answer = body
            .get("Answer")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !answer.is_empty() {
            let url = body
                .get("AbstractURL")
                .and_then(Value::as_str)
                .unwrap_or_default();
            results.push(
                SearchResult::new(format!("Answer: {query}"), url, answer, SOURCE).with_score(0.9),
            );
        }

        let definition = body
            .get("Definition")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !definition.is_empty() {
            let url = body
                .get("DefinitionURL")
                .and_then(Value::as_str)
                .unwrap_or_default();
            results.push(
                SearchResult::new(format!("Definition: {query}"), url, definition, SOURCE)
                    .with_score(lexical_relevance(query, query, definition)),
            );
        }

        if let Some(topics) = body.get("RelatedTopics").and_then(Value::as_array) {
            Self::collect_related_topics(query, topics, &mut results, max_results);
        }

        results.truncate(max_results);
        results
    }

    fn collect_related_topics(
        query: &str,
        topics: &[Value],
        results: &mut Vec<SearchResult>,
        max_results: usize,
    ) {
        for topic in topics {
            if results.len() >= max_results {
                return;
            }
            // Category groups nest their entries under "Topics".
            if let Some(nested) = topic.get("Topics").and_then(Value::as_array) {
                Self::collect_related_topics(query, nested, results, max_results);
                continue;
            }
            let text = topic.get("Text").and_then(Value::as_str).unwrap_or_default();
            let url = topic
                .get("FirstURL")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if text.is_empty() || url.is_empty() {
                continue;
            }
            let title: String = text.chars().take(80).collect();
            results.push(
                SearchResult::new(title.clone(), url, text, SOURCE)
                    .with_score(lexical_relevance(query, &title, text)),
            );
        }
    }

    /// Scrape the standard HTML endpoint.
    fn parse_html_results(query: &str, html: &str, max_results: usize) -> Vec<SearchResult> {
        let snippets: Vec<String> = html_snippet_regex()
            .captures_iter(html)
            .map(|cap| clean_html(&cap[1]))
            .collect();

        html_result_regex()
            .captures_iter(html)
            .take(max_results)
            .enumerate()
            .map(|(i, cap)| {
                let url = resolve_redirect(&cap[1]);
                let title = clean_html(&cap[2]);
                let snippet = snippets.get(i).cloned().unwrap_or_default();
                let score = lexical_relevance(query, &title, &snippet);
                SearchResult::new(title, url, snippet, SOURCE).with_score(score)
            })
            .filter(|r| !r.title.is_empty() && !r.url.is_empty())
            .collect()
    }

    /// Scrape the lite endpoint (plain table of links, no snippets).
    fn parse_lite_results(query: &str, html: &str, max_results: usize) -> Vec<SearchResult> {
        lite_result_regex()
            .captures_iter(html)
            .map(|cap| {
                let url = resolve_redirect(&cap[1]);
                let title = clean_html(&cap[2]);
                let score = lexical_relevance(query, &title, "");
                SearchResult::new(title, url, "", SOURCE).with_score(score)
            })
            .filter(|r| !r.title.is_empty() && r.url.starts_with("http"))
            .take(max_results)
            .collect()
    }

    async fn instant_answer(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(INSTANT_ANSWER_URL)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;
        let body: Value = response.json().await?;
        Ok(Self::parse_instant_answer(query, &body, max_results))
    }

    async fn html_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(HTML_URL)
            .query(&[("q", query)])
            .send()
            .await?;
        let html = response.text().await?;
        Ok(Self::parse_html_results(query, &html, max_results))
    }

    async fn lite_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(LITE_URL)
            .query(&[("q", query)])
            .send()
            .await?;
        let html = response.text().await?;
        Ok(Self::parse_lite_results(query, &html, max_results))
    }
}

impl Default for DuckDuckGoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchAdapter for DuckDuckGoAdapter {
    fn service_name(&self) -> &str {
        SOURCE
    }

    async fn perform_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let max = options.max_results;

        match self.instant_answer(query, max).await {
            Ok(results) if !results.is_empty() => return Ok(results),
            Ok(_) => debug!(query, "No instant answers; falling back to HTML search"),
            Err(err) => debug!(query, error = %err, "Instant-answer endpoint failed"),
        }

        match self.html_search(query, max).await {
            Ok(results) if !results.is_empty() => return Ok(results),
            Ok(_) => debug!(query, "HTML search empty; trying lite endpoint"),
            Err(err) => debug!(query, error = %err, "HTML endpoint failed"),
        }

        self.lite_search(query, max).await
    }
}
