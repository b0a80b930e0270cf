//! # DeepScout Core
//!
//! Multi-agent deep research orchestrator. Given a free-form research
//! question, drives a two-tier loop of LM reasoning calls and multi-source
//! web searches (a supervisor delegating topics, sub-agents iterating
//! through tool calls) and produces a structured final report.
//!
//! The crate consumes two injected capabilities: an [`lm::LmProvider`] and
//! the search aggregator from `deepscout-search`; it exposes one
//! operation, [`DeepResearcher::conduct_deep_research`].

pub mod config;
pub mod error;
pub mod lm;
pub mod orchestrator;
pub mod protocol;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{DeepResearchConfig, SearchDepth};
pub use error::{ConfigError, LmError, ProtocolError, ResearchError};
pub use lm::{HttpLmProvider, LmProvider, LmResponse, MockLmProvider};
pub use orchestrator::DeepResearcher;
pub use protocol::{parse_tool_calls, ControlSignal, ToolDispatcher, TOOL_CATALOG};
pub use types::{DeepResearchResult, ResearchMessage, ResearchState, Role, ToolCall};
