//! Core data types for the search subsystem.
//!
//! Defines the uniform result shape returned by every provider adapter,
//! the request options consumed by adapters and the aggregator, and URL
//! normalization (the identity used for cross-source deduplication).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Category of search a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Web,
    Scholar,
    News,
    Documentation,
    Code,
    Images,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Web => write!(f, "Web"),
            SearchType::Scholar => write!(f, "Scholar"),
            SearchType::News => write!(f, "News"),
            SearchType::Documentation => write!(f, "Documentation"),
            SearchType::Code => write!(f, "Code"),
            SearchType::Images => write!(f, "Images"),
        }
    }
}

/// A single hit returned by any provider.
///
/// The normalized `url` is the identity key for deduplication; two results
/// whose URLs normalize to the same string are considered the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title (non-empty for well-formed results).
    pub title: String,
    /// Result URL as returned by the provider.
    pub url: String,
    /// Snippet or abstract; may be empty.
    #[serde(default)]
    pub snippet: String,
    /// Tag of the provider that produced this result.
    pub source: String,
    /// Relevance in [0, 1]. Providers without native scoring use the
    /// lexical heuristic; 0.5 when nothing better is known.
    pub relevance_score: f64,
    /// Opaque provider-specific fields (published date, authors, ...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SearchResult {
    /// Create a result with the default relevance of 0.5.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source: source.into(),
            relevance_score: 0.5,
            metadata: HashMap::new(),
        }
    }

    /// Set the relevance score, clamped to [0, 1].
    pub fn with_score(mut self, score: f64) -> Self {
        self.relevance_score = score.clamp(0.0, 1.0);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The deduplication key for this result.
    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }
}

/// Request options honored by every adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum results the adapter should return.
    pub max_results: usize,
    /// Per-adapter timeout in milliseconds.
    pub timeout_ms: u64,
    /// External cancellation; composed with the timeout inside the adapter.
    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
    /// Search category; adapters that support categorical endpoints route on it.
    pub search_type: SearchType,
    /// Language restriction (provider-specific code, e.g. `lang_en`).
    pub language: Option<String>,
    /// Recency restriction (provider-specific, e.g. `d7` for the last week).
    pub date_restrict: Option<String>,
    /// Restrict results to a single site.
    pub site_search: Option<String>,
    /// Restrict results to a file type (e.g. `pdf`).
    pub file_type: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_ms: 10_000,
            cancel: None,
            search_type: SearchType::Web,
            language: None,
            date_restrict: None,
            site_search: None,
            file_type: None,
        }
    }
}

impl SearchOptions {
    /// Options for a given category with everything else defaulted.
    pub fn for_type(search_type: SearchType) -> Self {
        Self {
            search_type,
            ..Self::default()
        }
    }
}

/// How the aggregator fuses results from multiple adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineStrategy {
    /// Flatten and sort by weighted score.
    Merge,
    /// Round-robin across adapters, preserving each adapter's order.
    Interleave,
    /// Group by normalized URL and average scores weighted per source.
    #[default]
    Weighted,
}

/// Options for a unified (multi-adapter) search.
#[derive(Debug, Clone)]
pub struct UnifiedSearchOptions {
    /// Base per-adapter options. `max_results` here bounds the fused output
    /// (default 20), not the per-adapter fetch.
    pub base: SearchOptions,
    /// Provider tags to query; intersected with the available adapters.
    pub sources: Vec<String>,
    /// Fusion strategy.
    pub combine_strategy: CombineStrategy,
    /// Per-provider weight overrides; unset providers use the built-in defaults.
    pub weights: HashMap<String, f64>,
    /// Collapse duplicate normalized URLs in the fused output.
    pub deduplicate: bool,
    /// Cap on results requested from each adapter.
    pub max_results_per_source: usize,
}

impl Default for UnifiedSearchOptions {
    fn default() -> Self {
        Self {
            base: SearchOptions {
                max_results: 20,
                ..SearchOptions::default()
            },
            sources: Vec::new(),
            combine_strategy: CombineStrategy::Weighted,
            weights: HashMap::new(),
            deduplicate: true,
            max_results_per_source: 10,
        }
    }
}

impl UnifiedSearchOptions {
    /// Unified options targeting the given provider tags.
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Normalize a URL to its deduplication identity.
///
/// Keeps `origin + path + query`, strips the fragment and any trailing
/// slash on the path. Unparseable inputs fall back to lowercasing and
/// trailing-slash stripping so the function is total.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => {
            let origin = parsed.origin().ascii_serialization();
            let path = parsed.path().trim_end_matches('/');
            match parsed.query() {
                Some(query) => format!("{origin}{path}?{query}"),
                None => format!("{origin}{path}"),
            }
        }
        Err(_) => raw.trim().trim_end_matches('/').to_lowercase(),
    }
}
