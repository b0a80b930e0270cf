//! Per-invocation research configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How aggressively the search providers dig. Forwarded to providers that
/// support depth tiers (Tavily).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// Immutable configuration for one `conduct_deep_research` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepResearchConfig {
    /// LM provider tag passed to `LmProvider::generate`.
    pub provider: String,
    /// Model identifier passed to `LmProvider::generate`.
    pub model: String,
    /// Supervisor iteration cap.
    pub max_iterations: usize,
    /// Advisory bound on parallel sub-agents, surfaced in the supervisor
    /// prompt only; sub-agents execute serially.
    pub max_concurrent_agents: usize,
    /// Search depth forwarded to the aggregator.
    pub search_depth: SearchDepth,
    /// Wall-clock budget for the whole invocation, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DeepResearchConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_iterations: 3,
            max_concurrent_agents: 3,
            search_depth: SearchDepth::Basic,
            timeout_ms: 180_000,
        }
    }
}

impl DeepResearchConfig {
    /// Validate bounds before the pipeline starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations < 1 {
            return Err(ConfigError::Invalid {
                message: "max_iterations must be >= 1".into(),
            });
        }
        if self.max_concurrent_agents < 1 {
            return Err(ConfigError::Invalid {
                message: "max_concurrent_agents must be >= 1".into(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                message: "timeout_ms must be > 0".into(),
            });
        }
        Ok(())
    }
}
