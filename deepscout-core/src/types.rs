//! Core type definitions for the research orchestrator.
//!
//! Conversation messages, tool calls, the per-invocation research state,
//! and the terminal result shape. Everything crossing the public boundary
//! is plain serde data, so a `DeepResearchResult` serializes to JSON
//! without further transformation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Participant role in a research conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A structured tool invocation extracted from assistant text.
///
/// Lifecycle: created by the parser, consumed by the dispatcher, answered
/// by exactly one tool-role message carrying the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a call with a fresh unique id.
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: format!("call_{}", Uuid::new_v4()),
            name: name.into(),
            arguments,
        }
    }

    /// Read a string argument. Non-string JSON values are not coerced.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// One turn in a research conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchMessage {
    pub role: Role,
    pub content: String,
    /// Tool calls carried by an assistant turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool turns: the id of the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool turns: the name of the tool that produced this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResearchMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Assistant turn with the tool calls parsed out of it.
    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Tool turn answering the call with the given id.
    pub fn tool(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            name: Some(tool_name.into()),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// Orchestration accumulator, exclusively owned by one
/// `conduct_deep_research` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchState {
    /// The original user query, trimmed.
    pub user_query: String,
    /// The planning artifact produced in phase 2.
    pub research_brief: String,
    /// Key questions extracted alongside the brief.
    pub key_questions: Vec<String>,
    /// Scope statement for the brief.
    pub research_scope: String,
    /// Compressed findings consumed by the report phase.
    pub notes: Vec<String>,
    /// Lineage strings kept for audit.
    pub raw_notes: Vec<String>,
    /// The supervisor conversation.
    pub supervisor_messages: Vec<ResearchMessage>,
    /// Supervisor iterations consumed so far.
    pub research_iterations: usize,
}

impl ResearchState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            user_query: query.into(),
            research_brief: String::new(),
            key_questions: Vec::new(),
            research_scope: String::new(),
            notes: Vec::new(),
            raw_notes: Vec::new(),
            supervisor_messages: Vec::new(),
            research_iterations: 0,
        }
    }
}

/// Terminal output of a research invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepResearchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DeepResearchResult {
    /// A failed invocation with an optional detail payload (e.g. the
    /// clarification question).
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            research_brief: None,
            final_report: None,
            notes: Vec::new(),
            raw_notes: Vec::new(),
            error: Some(error.into()),
            details,
        }
    }

    /// A successful invocation carrying the report and its lineage.
    pub fn completed(state: ResearchState, final_report: String) -> Self {
        Self {
            success: true,
            research_brief: Some(state.research_brief),
            final_report: Some(final_report),
            notes: state.notes,
            raw_notes: state.raw_notes,
            error: None,
            details: None,
        }
    }
}
