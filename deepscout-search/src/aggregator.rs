//! Unified multi-source search aggregator.
//!
//! Fans a query out to every selected adapter in parallel, waits for all
//! of them to settle, and fuses the batches with one of three strategies.
//! A failing adapter contributes an empty batch and a warning; it never
//! fails the unified search. Final ordering is decided purely by the
//! combine strategy, not by adapter completion order.

use crate::adapter::SearchAdapter;
use crate::adapters::{
    Context7Adapter, DuckDuckGoAdapter, GoogleSearchAdapter, LangSearchAdapter, TavilyAdapter,
};
use crate::config::ProviderCredentials;
use crate::types::{
    normalize_url, CombineStrategy, SearchOptions, SearchResult, SearchType, UnifiedSearchOptions,
};
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hosts that count as documentation for the doc-search filter.
const DOC_HOST_MARKERS: &[&str] = &[
    "docs.",
    "doc.",
    "readthedocs",
    "github.io",
    "developer.",
    "learn.microsoft.com",
    "devdocs.io",
    "context7.com",
    "/docs",
    "/documentation",
    "/reference",
    "/api/",
];

fn default_weight(source: &str) -> f64 {
    match source {
        "google" => 1.2,
        "tavily" => 1.1,
        "langsearch" => 1.15,
        "duckduckgo" => 1.0,
        "context7" => 1.3,
        _ => 1.0,
    }
}

pub struct UnifiedSearchAggregator {
    adapters: Vec<Arc<dyn SearchAdapter>>,
    weights: HashMap<String, f64>,
}

impl UnifiedSearchAggregator {
    /// Build the aggregator from credentials, registering only providers
    /// whose credentials are present. DuckDuckGo and Context7 are always
    /// registered. `search_depth` is forwarded to Tavily.
    pub fn new(credentials: &ProviderCredentials, search_depth: &str) -> Self {
        let mut adapters: Vec<Arc<dyn SearchAdapter>> = Vec::new();

        if credentials.has_google() {
            adapters.push(Arc::new(GoogleSearchAdapter::new(
                credentials.google_api_key.clone(),
                credentials.google_cse_id.clone(),
            )));
        }
        adapters.push(Arc::new(DuckDuckGoAdapter::new()));
        if credentials.has_tavily() {
            adapters.push(Arc::new(
                TavilyAdapter::new(credentials.tavily_api_key.clone())
                    .with_search_depth(search_depth),
            ));
        }
        if credentials.has_langsearch() {
            adapters.push(Arc::new(LangSearchAdapter::new(
                credentials.langsearch_api_key.clone(),
            )));
        }
        adapters.push(Arc::new(Context7Adapter::new(
            credentials.context7_base_url.clone(),
        )));

        info!(
            providers = ?adapters.iter().map(|a| a.service_name()).collect::<Vec<_>>(),
            "Search aggregator initialized"
        );

        Self::with_adapters(adapters)
    }

    /// Build from a caller-supplied adapter set (tests, custom wiring).
    pub fn with_adapters(adapters: Vec<Arc<dyn SearchAdapter>>) -> Self {
        let weights = adapters
            .iter()
            .map(|a| {
                let name = a.service_name().to_string();
                let weight = default_weight(&name);
                (name, weight)
            })
            .collect();
        Self { adapters, weights }
    }

    /// Override the fusion weight for a provider.
    pub fn set_weight(&mut self, source: impl Into<String>, weight: f64) {
        self.weights.insert(source.into(), weight);
    }

    /// Tags of all currently available providers.
    pub fn available_sources(&self) -> Vec<String> {
        self.adapters
            .iter()
            .filter(|a| a.is_available())
            .map(|a| a.service_name().to_string())
            .collect()
    }

    fn weight_for(&self, source: &str, options: &UnifiedSearchOptions) -> f64 {
        options
            .weights
            .get(source)
            .copied()
            .or_else(|| self.weights.get(source).copied())
            .unwrap_or(1.0)
    }

    /// Adapters selected by `options.sources`, in the order the caller
    /// listed them. Unavailable and unknown tags are dropped.
    fn select_adapters(&self, sources: &[String]) -> Vec<Arc<dyn SearchAdapter>> {
        sources
            .iter()
            .filter_map(|tag| {
                self.adapters
                    .iter()
                    .find(|a| a.service_name() == tag.as_str() && a.is_available())
                    .cloned()
            })
            .collect()
    }

    /// Unified search across the selected providers.
    pub async fn search(&self, query: &str, options: &UnifiedSearchOptions) -> Vec<SearchResult> {
        let selected = self.select_adapters(&options.sources);
        if selected.is_empty() {
            debug!(query, "No available adapters match the requested sources");
            return Vec::new();
        }

        let per_source = SearchOptions {
            max_results: options.max_results_per_source,
            ..options.base.clone()
        };

        let futures = selected.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let per_source = per_source.clone();
            let query = query.to_string();
            async move {
                let name = adapter.service_name().to_string();
                match adapter.search(&query, &per_source).await {
                    Ok(results) => (name, results),
                    Err(err) => {
                        warn!(provider = %name, error = %err, "Adapter failed; skipping its results");
                        (name, Vec::new())
                    }
                }
            }
        });

        let batches: Vec<(String, Vec<SearchResult>)> = join_all(futures).await;

        let combined = match options.combine_strategy {
            CombineStrategy::Merge => self.combine_merge(&batches, options),
            CombineStrategy::Interleave => Self::combine_interleave(&batches),
            CombineStrategy::Weighted => self.combine_weighted(&batches, options),
        };

        let mut fused = if options.deduplicate {
            Self::deduplicate(combined)
        } else {
            combined
        };

        fused.truncate(options.base.max_results);
        fused
    }

    /// Flatten and sort by `score x weight`, descending. The sort is
    /// stable, so ties keep the caller's source order.
    fn combine_merge(
        &self,
        batches: &[(String, Vec<SearchResult>)],
        options: &UnifiedSearchOptions,
    ) -> Vec<SearchResult> {
        let mut flat: Vec<(f64, SearchResult)> = Vec::new();
        for (source, results) in batches {
            let weight = self.weight_for(source, options);
            for result in results {
                flat.push((result.relevance_score * weight, result.clone()));
            }
        }
        flat.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        flat.into_iter().map(|(_, r)| r).collect()
    }

    /// Round-robin across adapters, preserving each adapter's own order.
    fn combine_interleave(batches: &[(String, Vec<SearchResult>)]) -> Vec<SearchResult> {
        let mut out = Vec::new();
        let longest = batches.iter().map(|(_, b)| b.len()).max().unwrap_or(0);
        for i in 0..longest {
            for (_, batch) in batches {
                if let Some(result) = batch.get(i) {
                    out.push(result.clone());
                }
            }
        }
        out
    }

    /// Group by normalized URL; each group scores Σ(sᵢwᵢ)/Σwᵢ, keeps the
    /// member with the longest snippet, and records every contributing
    /// source tag under `metadata.sources`.
    fn combine_weighted(
        &self,
        batches: &[(String, Vec<SearchResult>)],
        options: &UnifiedSearchOptions,
    ) -> Vec<SearchResult> {
        struct Group {
            representative: SearchResult,
            weighted_sum: f64,
            weight_sum: f64,
            sources: Vec<String>,
        }

        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Group> = HashMap::new();

        for (source, results) in batches {
            let weight = self.weight_for(source, options);
            for result in results {
                let key = normalize_url(&result.url);
                match groups.get_mut(&key) {
                    Some(group) => {
                        group.weighted_sum += result.relevance_score * weight;
                        group.weight_sum += weight;
                        if !group.sources.contains(source) {
                            group.sources.push(source.clone());
                        }
                        if result.snippet.len() > group.representative.snippet.len() {
                            group.representative = result.clone();
                        }
                    }
                    None => {
                        order.push(key.clone());
                        groups.insert(
                            key,
                            Group {
                                representative: result.clone(),
                                weighted_sum: result.relevance_score * weight,
                                weight_sum: weight,
                                sources: vec![source.clone()],
                            },
                        );
                    }
                }
            }
        }

        let mut fused: Vec<SearchResult> = order
            .into_iter()
            .filter_map(|key| groups.remove(&key))
            .map(|group| {
                let score = if group.weight_sum > 0.0 {
                    group.weighted_sum / group.weight_sum
                } else {
                    0.0
                };
                let sources = Value::Array(
                    group.sources.iter().cloned().map(Value::String).collect(),
                );
                group
                    .representative
                    .with_score(score)
                    .with_metadata("sources", sources)
            })
            .collect();

        fused.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fused
    }

    /// Collapse duplicate normalized URLs, preferring the entry with the
    /// higher score, then the longer snippet.
    fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut order: Vec<String> = Vec::new();
        let mut best: HashMap<String, SearchResult> = HashMap::new();

        for result in results {
            let key = normalize_url(&result.url);
            let keep = match best.get(&key) {
                Some(existing) => {
                    result.relevance_score > existing.relevance_score
                        || (result.relevance_score == existing.relevance_score
                            && result.snippet.len() > existing.snippet.len())
                }
                None => {
                    order.push(key.clone());
                    true
                }
            };
            if keep {
                best.insert(key, result);
            }
        }

        order.into_iter().filter_map(|k| best.remove(&k)).collect()
    }

    /// Scholar search across scholarly-capable providers. Falls back to a
    /// paper-biased DuckDuckGo search when no scholarly provider is
    /// configured.
    pub async fn search_scholar(
        &self,
        query: &str,
        mut options: UnifiedSearchOptions,
    ) -> Vec<SearchResult> {
        options.base.search_type = SearchType::Scholar;
        options.sources = vec!["google".into(), "langsearch".into()];

        if self.select_adapters(&options.sources).is_empty() {
            let biased = format!("{query} research paper");
            options.sources = vec!["duckduckgo".into()];
            options.base.search_type = SearchType::Web;
            return self.search(&biased, &options).await;
        }

        self.search(query, &options).await
    }

    /// News search across news-capable providers.
    pub async fn search_news(
        &self,
        query: &str,
        mut options: UnifiedSearchOptions,
    ) -> Vec<SearchResult> {
        options.base.search_type = SearchType::News;
        options.sources = vec!["google".into(), "tavily".into(), "langsearch".into()];

        if self.select_adapters(&options.sources).is_empty() {
            let biased = format!("{query} latest news");
            options.sources = vec!["duckduckgo".into()];
            options.base.search_type = SearchType::Web;
            return self.search(&biased, &options).await;
        }

        self.search(query, &options).await
    }

    /// Documentation search: Context7 plus LangSearch's doc endpoint, with
    /// a docs-biased web fallback, filtered to documentation hosts.
    pub async fn search_documentation(
        &self,
        query: &str,
        library: Option<&str>,
    ) -> Vec<SearchResult> {
        let doc_query = match library {
            Some(library) => format!("{library} {query}"),
            None => query.to_string(),
        };

        let mut options = UnifiedSearchOptions::with_sources(["context7", "langsearch"]);
        options.base.search_type = SearchType::Documentation;
        let mut results = self.search(&doc_query, &options).await;

        let mut web_options =
            UnifiedSearchOptions::with_sources(["google", "duckduckgo"]);
        web_options.base.search_type = SearchType::Web;
        let web = self
            .search(&format!("{doc_query} documentation"), &web_options)
            .await;
        results.extend(
            web.into_iter()
                .filter(|r| Self::looks_like_documentation(&r.url)),
        );

        let mut deduped = Self::deduplicate(results);
        deduped.truncate(20);
        deduped
    }

    fn looks_like_documentation(url: &str) -> bool {
        let lower = url.to_lowercase();
        DOC_HOST_MARKERS.iter().any(|marker| lower.contains(marker))
    }
}
