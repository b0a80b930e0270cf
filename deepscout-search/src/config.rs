//! Construction-time configuration for the search providers.
//!
//! Credentials are resolved once, when the aggregator is built, via
//! `figment` layering (defaults -> `DEEPSCOUT_`-prefixed environment).
//! Adapters receive their keys at construction and never touch ambient
//! state at call time.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

/// API credentials and endpoint overrides for the provider adapters.
///
/// An adapter whose credentials are absent is simply not registered;
/// DuckDuckGo and Context7 need none and are always registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// Google Custom Search API key.
    pub google_api_key: Option<String>,
    /// Google Custom Search engine id (`cx`).
    pub google_cse_id: Option<String>,
    /// Tavily API key.
    pub tavily_api_key: Option<String>,
    /// LangSearch API key.
    pub langsearch_api_key: Option<String>,
    /// Override for the Context7 endpoint (defaults to the public API).
    pub context7_base_url: Option<String>,
}

impl ProviderCredentials {
    /// Load credentials from the environment.
    ///
    /// Recognized variables: `DEEPSCOUT_GOOGLE_API_KEY`,
    /// `DEEPSCOUT_GOOGLE_CSE_ID`, `DEEPSCOUT_TAVILY_API_KEY`,
    /// `DEEPSCOUT_LANGSEARCH_API_KEY`, `DEEPSCOUT_CONTEXT7_BASE_URL`.
    pub fn from_env() -> Self {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("DEEPSCOUT_"))
            .extract()
            .unwrap_or_default()
    }

    /// Whether the Google adapter can be registered.
    pub fn has_google(&self) -> bool {
        self.google_api_key.is_some() && self.google_cse_id.is_some()
    }

    /// Whether the Tavily adapter can be registered.
    pub fn has_tavily(&self) -> bool {
        self.tavily_api_key.is_some()
    }

    /// Whether the LangSearch adapter can be registered.
    pub fn has_langsearch(&self) -> bool {
        self.langsearch_api_key.is_some()
    }
}
