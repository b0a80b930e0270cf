//! Phase 2: research brief.
//!
//! The LM plans the research as `{research_brief, key_questions,
//! research_scope}`. On a JSON failure the raw text is salvaged as the
//! brief and question-like lines are extracted heuristically, so the brief
//! is always populated before phase 3 starts.

use super::{extract_json, prompts, DeepResearcher};
use crate::types::ResearchState;
use serde_json::Value;
use tracing::{debug, warn};

const DEFAULT_SCOPE: &str = "General overview and current state of the topic";

const MAX_KEY_QUESTIONS: usize = 5;

impl DeepResearcher {
    /// Populate `research_brief`, `key_questions` and `research_scope` on
    /// the state. Never fails.
    pub(super) async fn write_brief(&self, state: &mut ResearchState) {
        let text = match self.generate(&prompts::brief(&state.user_query)).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Brief call failed; falling back to the query itself");
                String::new()
            }
        };

        if let Some(json) = extract_json(&text) {
            if let Some(brief) = json
                .get("research_brief")
                .and_then(Value::as_str)
                .filter(|b| !b.trim().is_empty())
            {
                state.research_brief = brief.to_string();
                state.key_questions = json
                    .get("key_questions")
                    .and_then(Value::as_array)
                    .map(|questions| {
                        questions
                            .iter()
                            .filter_map(Value::as_str)
                            .map(String::from)
                            .take(MAX_KEY_QUESTIONS)
                            .collect()
                    })
                    .unwrap_or_default();
                state.research_scope = json
                    .get("research_scope")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_SCOPE)
                    .to_string();
                if state.key_questions.is_empty() {
                    state.key_questions = vec![default_question(&state.user_query)];
                }
                return;
            }
        }

        debug!("Brief response was not valid JSON; salvaging from raw text");
        self.salvage_brief(state, &text);
    }

    /// Heuristic salvage: raw text as the brief, question-like lines as
    /// the key questions, default scope.
    fn salvage_brief(&self, state: &mut ResearchState, text: &str) {
        let trimmed = text.trim();
        state.research_brief = if trimmed.is_empty() {
            state.user_query.clone()
        } else {
            trimmed.to_string()
        };

        state.key_questions = extract_question_lines(text);
        if state.key_questions.is_empty() {
            state.key_questions = vec![default_question(&state.user_query)];
        }
        state.research_scope = DEFAULT_SCOPE.to_string();
    }
}

fn default_question(query: &str) -> String {
    format!("What are the key aspects of {query}?")
}

/// Lines ending with `?` that start with an interrogative word.
fn extract_question_lines(text: &str) -> Vec<String> {
    const OPENERS: &[&str] = &["what", "how", "why", "when", "where"];
    text.lines()
        .map(str::trim)
        .map(|line| line.trim_start_matches(['-', '*', ' ']))
        .filter(|line| line.ends_with('?'))
        .filter(|line| {
            let lower = line.to_lowercase();
            OPENERS.iter().any(|opener| lower.starts_with(opener))
        })
        .map(String::from)
        .take(MAX_KEY_QUESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::MockLmProvider;
    use crate::orchestrator::tests::test_researcher;

    #[tokio::test]
    async fn test_structured_brief_parsed() {
        let mock = MockLmProvider::new();
        mock.queue_text(
            r#"{"research_brief": "Study few-shot text-to-SQL.",
                "key_questions": ["What are current techniques?", "How are they evaluated?"],
                "research_scope": "Techniques and benchmarks"}"#,
        );
        let researcher = test_researcher(mock);
        let mut state = ResearchState::new("few-shot text-to-SQL");
        researcher.write_brief(&mut state).await;

        assert_eq!(state.research_brief, "Study few-shot text-to-SQL.");
        assert_eq!(state.key_questions.len(), 2);
        assert_eq!(state.research_scope, "Techniques and benchmarks");
    }

    #[tokio::test]
    async fn test_non_json_salvaged_with_questions() {
        let mock = MockLmProvider::new();
        mock.queue_text(
            "We should investigate the topic broadly.\n\
             What are the main approaches?\n\
             This line is not a question.\n\
             How do they compare in practice?",
        );
        let researcher = test_researcher(mock);
        let mut state = ResearchState::new("topic");
        researcher.write_brief(&mut state).await;

        assert!(state.research_brief.contains("investigate the topic"));
        assert_eq!(state.key_questions.len(), 2);
        assert!(state.key_questions[0].starts_with("What"));
        assert_eq!(state.research_scope, DEFAULT_SCOPE);
    }

    #[tokio::test]
    async fn test_salvage_synthesizes_a_question_when_none_found() {
        let mock = MockLmProvider::new();
        mock.queue_text("A plain paragraph with no questions at all.");
        let researcher = test_researcher(mock);
        let mut state = ResearchState::new("graph databases");
        researcher.write_brief(&mut state).await;

        assert_eq!(state.key_questions.len(), 1);
        assert!(state.key_questions[0].contains("graph databases"));
    }

    #[tokio::test]
    async fn test_lm_failure_uses_query_as_brief() {
        let mock = MockLmProvider::new();
        mock.queue_error(crate::error::LmError::Timeout { timeout_secs: 30 });
        let researcher = test_researcher(mock);
        let mut state = ResearchState::new("quantum networking");
        researcher.write_brief(&mut state).await;

        assert_eq!(state.research_brief, "quantum networking");
        assert!(!state.key_questions.is_empty());
    }

    #[test]
    fn test_extract_question_lines_caps_at_five() {
        let text = (0..8)
            .map(|i| format!("What about aspect {i}?"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_question_lines(&text).len(), 5);
    }

    #[test]
    fn test_extract_question_lines_requires_interrogative_start() {
        let text = "Is this counted?\nWhere does it apply?";
        let questions = extract_question_lines(text);
        assert_eq!(questions, vec!["Where does it apply?"]);
    }

    #[test]
    fn test_extract_question_lines_strips_bullets() {
        let text = "- What is the baseline?";
        let questions = extract_question_lines(text);
        assert_eq!(questions, vec!["What is the baseline?"]);
    }
}
