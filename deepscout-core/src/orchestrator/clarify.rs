//! Phase 1: clarification gate.
//!
//! The LM is asked whether the query is specific enough. Anything short of
//! a well-formed `need_clarification: true` means "proceed"; an LM
//! failure or unparseable answer must not block research.

use super::{extract_json, prompts, DeepResearcher};
use serde_json::Value;
use tracing::warn;

impl DeepResearcher {
    /// Returns the clarifying question if the query is under-specified.
    pub(super) async fn clarify(&self, query: &str) -> Option<String> {
        let text = match self.generate(&prompts::clarify(query)).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Clarification call failed; proceeding without it");
                return None;
            }
        };

        let json = extract_json(&text)?;
        if json.get("need_clarification").and_then(Value::as_bool) != Some(true) {
            return None;
        }

        let question = json
            .get("question")
            .and_then(Value::as_str)
            .filter(|q| !q.trim().is_empty())
            .unwrap_or("Could you clarify what you want researched?");
        Some(question.to_string())
    }
}
