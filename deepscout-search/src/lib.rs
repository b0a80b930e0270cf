//! # DeepScout Search
//!
//! Unified multi-source web search: a uniform adapter interface over
//! heterogeneous search services, and an aggregator that fans a query out
//! to every available provider in parallel, fuses the results with
//! weighted scoring, and deduplicates them by normalized URL.

pub mod adapter;
pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod relevance;
pub mod types;

// Re-export commonly used types at the crate root.
pub use adapter::SearchAdapter;
pub use adapters::{
    Context7Adapter, DuckDuckGoAdapter, GoogleSearchAdapter, LangSearchAdapter, TavilyAdapter,
};
pub use aggregator::UnifiedSearchAggregator;
pub use config::ProviderCredentials;
pub use error::SearchError;
pub use relevance::lexical_relevance;
pub use types::{
    normalize_url, CombineStrategy, SearchOptions, SearchResult, SearchType, UnifiedSearchOptions,
};
