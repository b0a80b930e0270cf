//! The research orchestrator: a four-phase pipeline behind one entry
//! point.
//!
//! `conduct_deep_research` drives clarify -> brief -> multi-agent research
//! -> report, racing the whole run against the configured timeout. No
//! single component failure sinks an invocation: every phase has a typed
//! degradation path, and only input validation, a requested clarification,
//! or the top-level timeout produce a failure result.

mod brief;
mod clarify;
pub mod prompts;
mod report;
mod subagent;
mod supervisor;

use crate::config::DeepResearchConfig;
use crate::error::{LmError, ResearchError};
use crate::lm::LmProvider;
use crate::protocol::ToolDispatcher;
use crate::types::{DeepResearchResult, ResearchMessage, ResearchState, Role};
use deepscout_search::{ProviderCredentials, UnifiedSearchAggregator};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// The deep research orchestrator.
///
/// Holds no state of its own beyond its collaborators; each invocation
/// owns its `ResearchState` exclusively, so one instance can serve
/// sequential invocations.
pub struct DeepResearcher {
    lm: Arc<dyn LmProvider>,
    aggregator: Arc<UnifiedSearchAggregator>,
    dispatcher: ToolDispatcher,
    config: DeepResearchConfig,
}

impl DeepResearcher {
    /// Create an orchestrator over an LM and a pre-built aggregator.
    pub fn new(
        lm: Arc<dyn LmProvider>,
        aggregator: Arc<UnifiedSearchAggregator>,
        config: DeepResearchConfig,
    ) -> Result<Self, ResearchError> {
        config.validate()?;
        let dispatcher = ToolDispatcher::new(Arc::clone(&aggregator));
        Ok(Self {
            lm,
            aggregator,
            dispatcher,
            config,
        })
    }

    /// Create an orchestrator, building the aggregator from provider
    /// credentials (adapters without credentials are not registered).
    pub fn from_credentials(
        lm: Arc<dyn LmProvider>,
        credentials: &ProviderCredentials,
        config: DeepResearchConfig,
    ) -> Result<Self, ResearchError> {
        let aggregator = Arc::new(UnifiedSearchAggregator::new(
            credentials,
            config.search_depth.as_str(),
        ));
        Self::new(lm, aggregator, config)
    }

    /// Run the full research pipeline for a query.
    pub async fn conduct_deep_research(&self, query: &str) -> DeepResearchResult {
        let query = query.trim();
        if query.len() < 3 {
            return DeepResearchResult::failure("Query must be ≥3 chars", None);
        }

        info!(query, "Starting deep research");
        let timeout = Duration::from_millis(self.config.timeout_ms);

        match tokio::time::timeout(timeout, self.run_pipeline(query)).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!(error = %err, "Research pipeline failed");
                DeepResearchResult::failure(err.to_string(), None)
            }
            Err(_) => {
                let err = ResearchError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                };
                warn!(error = %err, "Research invocation timed out");
                DeepResearchResult::failure(err.to_string(), None)
            }
        }
    }

    async fn run_pipeline(&self, query: &str) -> Result<DeepResearchResult, ResearchError> {
        let mut state = ResearchState::new(query);

        // Phase 1: clarification gate.
        if let Some(question) = self.clarify(query).await {
            info!(question, "Query needs clarification");
            return Ok(DeepResearchResult::failure(
                "Clarification needed",
                Some(question),
            ));
        }

        // Phase 2: research brief.
        self.write_brief(&mut state).await;

        // Phase 3: supervised multi-agent research.
        self.run_supervisor(&mut state).await;

        // Phase 4: final report.
        let final_report = self.write_report(&state).await;

        info!(
            notes = state.notes.len(),
            iterations = state.research_iterations,
            report_chars = final_report.len(),
            "Deep research completed"
        );

        Ok(DeepResearchResult::completed(state, final_report))
    }

    /// One LM call with this invocation's provider/model pair.
    pub(crate) async fn generate(&self, prompt: &str) -> Result<String, LmError> {
        self.lm
            .generate(prompt, &self.config.provider, &self.config.model)
            .await
            .map(|response| response.content)
    }
}

/// Flatten a conversation into a single prompt for the text-only LM
/// interface, ending with an open assistant turn.
pub(crate) fn render_transcript(messages: &[ResearchMessage]) -> String {
    let mut out = String::new();
    for msg in messages {
        match msg.role {
            Role::System => out.push_str(&format!("System: {}\n\n", msg.content)),
            Role::User => out.push_str(&format!("User: {}\n\n", msg.content)),
            Role::Assistant => out.push_str(&format!("Assistant: {}\n\n", msg.content)),
            Role::Tool => out.push_str(&format!(
                "Tool ({}): {}\n\n",
                msg.name.as_deref().unwrap_or("tool"),
                msg.content
            )),
        }
    }
    out.push_str("Assistant:");
    out
}

/// Pull the first JSON object out of LM text, tolerating prose and code
/// fences around it.
pub(crate) fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
