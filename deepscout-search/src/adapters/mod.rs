//! Concrete provider adapters.

pub mod context7;
pub mod duckduckgo;
pub mod google;
pub mod langsearch;
pub mod tavily;

pub use context7::Context7Adapter;
pub use duckduckgo::DuckDuckGoAdapter;
pub use google::GoogleSearchAdapter;
pub use langsearch::LangSearchAdapter;
pub use tavily::TavilyAdapter;
