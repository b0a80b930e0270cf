//! Error types for the research orchestrator.
//!
//! Structured `thiserror` variants per domain. The orchestrator's public
//! entry point never propagates these (every failure is folded into a
//! `DeepResearchResult { success: false, .. }`), but internal phases use
//! them to decide which degradation path applies.

/// Top-level error type for the orchestrator core.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("LM error: {0}")]
    Lm(#[from] LmError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Research timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from language-model calls.
#[derive(Debug, thiserror::Error)]
pub enum LmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("Failed to parse LM response: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("LM request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the tool-call protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Tool '{tool}' call is missing required argument '{argument}'")]
    MissingArgument { tool: String, argument: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },
}

/// Errors from configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
