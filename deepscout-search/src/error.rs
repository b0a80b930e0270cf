//! Error types for the search subsystem.
//!
//! Structured `thiserror` variants per failure domain. Adapters surface
//! these from `perform_search`; the aggregator absorbs them per provider
//! so one failing service never sinks a unified search.

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider '{name}' error: {message}")]
    Provider { name: String, message: String },

    #[error("Provider '{name}' is not configured (missing credentials)")]
    MissingCredentials { name: String },

    #[error("Failed to parse response from '{name}': {message}")]
    ResponseParse { name: String, message: String },

    #[error("Search on '{name}' was cancelled")]
    Cancelled { name: String },

    #[error("Search on '{name}' timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },
}

impl SearchError {
    /// Whether this error came from the timeout/cancellation path, which
    /// the adapter wrapper converts into an empty-result success.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            SearchError::Cancelled { .. } | SearchError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SearchError::Provider {
            name: "google".into(),
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "Provider 'google' error: quota exceeded");

        let err = SearchError::Timeout {
            name: "tavily".into(),
            timeout_ms: 10_000,
        };
        assert_eq!(err.to_string(), "Search on 'tavily' timed out after 10000ms");
    }

    #[test]
    fn test_is_cancellation() {
        assert!(SearchError::Cancelled { name: "x".into() }.is_cancellation());
        assert!(SearchError::Timeout {
            name: "x".into(),
            timeout_ms: 1
        }
        .is_cancellation());
        assert!(!SearchError::MissingCredentials { name: "x".into() }.is_cancellation());
    }
}
