//! Tool-call dispatch.
//!
//! Every dispatched call produces exactly one tool-role message carrying
//! either the formatted result or the failure text; a call is never
//! silently dropped. `research_complete` additionally raises a control
//! signal the supervisor loop watches for. `conduct_research` is the one
//! catalog entry not handled here: the supervisor executes it through the
//! sub-agent loop, since it recurses into the orchestrator.

use super::format::format_results;
use crate::types::{ResearchMessage, ToolCall};
use deepscout_search::{UnifiedSearchAggregator, UnifiedSearchOptions};
use std::sync::Arc;
use tracing::{debug, warn};

/// Control-flow signals surfaced by tool execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// A `research_complete` call fired; the supervisor should exit.
    ResearchComplete,
}

/// The outcome of dispatching one tool call.
#[derive(Debug)]
pub struct ToolExecution {
    pub message: ResearchMessage,
    pub signal: Option<ControlSignal>,
}

impl ToolExecution {
    fn reply(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            message: ResearchMessage::tool(&call.id, &call.name, content),
            signal: None,
        }
    }
}

/// Sources queried by a plain `web_search`.
const WEB_SOURCES: &[&str] = &["google", "duckduckgo", "tavily", "langsearch"];

pub struct ToolDispatcher {
    aggregator: Arc<UnifiedSearchAggregator>,
}

impl ToolDispatcher {
    pub fn new(aggregator: Arc<UnifiedSearchAggregator>) -> Self {
        Self { aggregator }
    }

    /// Execute one call and produce its tool-role message.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolExecution {
        debug!(tool = %call.name, id = %call.id, "Dispatching tool call");
        match call.name.as_str() {
            "web_search" => {
                let query = self.query_of(call);
                let options = UnifiedSearchOptions::with_sources(WEB_SOURCES.iter().copied());
                let results = self.aggregator.search(&query, &options).await;
                ToolExecution::reply(call, format_results("Web", &query, &results))
            }
            "scholar_search" => {
                let query = self.query_of(call);
                let results = self
                    .aggregator
                    .search_scholar(&query, UnifiedSearchOptions::default())
                    .await;
                ToolExecution::reply(call, format_results("Scholar", &query, &results))
            }
            "news_search" => {
                let query = self.query_of(call);
                let results = self
                    .aggregator
                    .search_news(&query, UnifiedSearchOptions::default())
                    .await;
                ToolExecution::reply(call, format_results("News", &query, &results))
            }
            "doc_search" => {
                let query = self.query_of(call);
                let library = call.arg_str("library");
                let results = self.aggregator.search_documentation(&query, library).await;
                ToolExecution::reply(call, format_results("Documentation", &query, &results))
            }
            "think" => {
                let thoughts = call.arg_str("thoughts").unwrap_or_default();
                ToolExecution::reply(call, format!("Thinking: {thoughts}"))
            }
            "research_complete" => {
                let summary = call.arg_str("summary").unwrap_or_default();
                ToolExecution {
                    message: ResearchMessage::tool(
                        &call.id,
                        &call.name,
                        format!("Research complete: {summary}"),
                    ),
                    signal: Some(ControlSignal::ResearchComplete),
                }
            }
            "conduct_research" => {
                // Reached only if a sub-agent tries to delegate; the
                // supervisor intercepts its own conduct_research calls.
                ToolExecution::reply(
                    call,
                    "conduct_research is only available to the supervisor.",
                )
            }
            other => {
                warn!(tool = other, "Unknown tool requested");
                ToolExecution::reply(call, format!("Unknown tool: {other}"))
            }
        }
    }

    fn query_of(&self, call: &ToolCall) -> String {
        call.arg_str("query").unwrap_or_default().to_string()
    }
}
