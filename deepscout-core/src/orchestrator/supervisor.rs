//! Phase 3, outer loop: the research supervisor.
//!
//! Each iteration sends the supervisor conversation to the LM, parses the
//! tool calls out of the reply, and executes them in parse order.
//! `conduct_research` calls run the sub-agent loop serially and append to
//! the notes; `research_complete` ends the phase. A first-round reply with
//! no calls and no notes triggers the forced-research fallback so an
//! uncooperative model still yields findings.

use super::{prompts, render_transcript, DeepResearcher};
use crate::protocol::{parse_tool_calls, ControlSignal};
use crate::types::{ResearchMessage, ResearchState};
use tracing::{debug, info, warn};

impl DeepResearcher {
    pub(super) async fn run_supervisor(&self, state: &mut ResearchState) {
        state.supervisor_messages.push(ResearchMessage::system(
            prompts::supervisor_system(
                &state.research_brief,
                &state.key_questions,
                self.config.max_concurrent_agents,
                self.config.max_iterations,
            ),
        ));
        state.supervisor_messages.push(ResearchMessage::user(format!(
            "Begin the research for: {}",
            state.research_brief
        )));

        while state.research_iterations < self.config.max_iterations {
            state.research_iterations += 1;
            debug!(
                iteration = state.research_iterations,
                max = self.config.max_iterations,
                "Supervisor iteration"
            );

            let text = match self
                .generate(&render_transcript(&state.supervisor_messages))
                .await
            {
                Ok(text) => text,
                Err(err) => {
                    // Absorbed: an LM failure is treated as a reply with
                    // no tool calls.
                    warn!(error = %err, "Supervisor LM call failed");
                    String::new()
                }
            };

            let calls = parse_tool_calls(&text);
            state
                .supervisor_messages
                .push(ResearchMessage::assistant_with_calls(
                    text.clone(),
                    calls.clone(),
                ));

            if calls.is_empty() {
                if state.research_iterations == 1 && state.notes.is_empty() {
                    info!("Supervisor produced no tool calls; running forced research");
                    self.run_forced_research(state).await;
                    return;
                }
                continue;
            }

            let mut complete = false;
            for call in &calls {
                if call.name == "conduct_research" {
                    let topic = call
                        .arg_str("research_topic")
                        .unwrap_or(&state.user_query)
                        .to_string();
                    info!(topic, "Delegating topic to a sub-agent");
                    let summary = self.run_subagent(&topic).await;
                    state.notes.push(summary.clone());
                    state
                        .raw_notes
                        .push(format!("Research on: {topic}\n{summary}"));
                    state
                        .supervisor_messages
                        .push(ResearchMessage::tool(&call.id, &call.name, summary));
                } else {
                    let execution = self.dispatcher.dispatch(call).await;
                    if execution.signal == Some(ControlSignal::ResearchComplete) {
                        complete = true;
                    }
                    state.supervisor_messages.push(execution.message);
                }
            }

            if complete {
                info!(
                    notes = state.notes.len(),
                    "Supervisor signalled research_complete"
                );
                return;
            }
        }

        info!(
            iterations = state.research_iterations,
            notes = state.notes.len(),
            "Supervisor reached its iteration cap"
        );
    }

    /// Fallback when the supervisor stalls immediately: synthesize topics
    /// from the query and research each one directly.
    async fn run_forced_research(&self, state: &mut ResearchState) {
        for topic in synthesize_topics(&state.user_query) {
            let summary = self.run_subagent(&topic).await;
            state.notes.push(summary.clone());
            state
                .raw_notes
                .push(format!("Forced research on: {topic}\n{summary}"));
        }
    }
}

const TOPIC_STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "about", "what", "how", "why", "when", "where", "are",
    "was", "were", "does", "can", "could", "should", "would", "tell", "explain",
];

/// Significant terms from the query, for topic templating.
fn significant_terms(query: &str) -> String {
    let terms: Vec<&str> = query
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.len() > 2 && !TOPIC_STOPWORDS.contains(&w.to_lowercase().as_str()))
        .take(4)
        .collect();

    if terms.is_empty() {
        query.trim().to_string()
    } else {
        terms.join(" ")
    }
}

/// Synthesize 2-3 research topics directly from the user query.
pub(super) fn synthesize_topics(query: &str) -> Vec<String> {
    let key = significant_terms(query);
    let mut topics = vec![
        format!("Current developments in {key}"),
        format!("Practical applications and future trends in {key}"),
    ];

    let lower = query.to_lowercase();
    let mentions_ai = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| matches!(token, "ai" | "ml" | "llm" | "llms"))
        || lower.contains("artificial intelligence")
        || lower.contains("machine learning")
        || lower.contains("deep learning");
    if mentions_ai {
        topics.push("Recent breakthroughs in artificial intelligence research".to_string());
    }

    topics.truncate(3);
    topics
}
