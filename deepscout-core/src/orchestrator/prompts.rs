//! Prompt templates for the four research phases.
//!
//! Every prompt that drives tool use ends with the deterministic tool
//! description block from the catalog, so the calling syntax the parser
//! expects is always in front of the model.

use crate::protocol::tool_prompt_block;
use chrono::Utc;

/// Phase 1: decide whether the query needs clarification.
pub fn clarify(query: &str) -> String {
    format!(
        "A user wants deep research performed on the following question:\n\n\
         \"{query}\"\n\n\
         Decide whether the question is specific enough to research as-is. \
         Respond with a JSON object only, no other text:\n\
         {{\"need_clarification\": true or false, \
         \"question\": \"<clarifying question if needed>\", \
         \"verification\": \"<one sentence on how you interpreted the request>\"}}"
    )
}

/// Phase 2: produce the research brief.
pub fn brief(query: &str) -> String {
    format!(
        "Turn the following research question into a research plan:\n\n\
         \"{query}\"\n\n\
         Respond with a JSON object only:\n\
         {{\"research_brief\": \"<a focused paragraph restating the research objective>\", \
         \"key_questions\": [\"<3-5 concrete questions to answer>\"], \
         \"research_scope\": \"<what is in and out of scope>\"}}"
    )
}

/// Phase 3: the supervisor's system prompt.
pub fn supervisor_system(
    research_brief: &str,
    key_questions: &[String],
    max_concurrent_agents: usize,
    max_iterations: usize,
) -> String {
    let questions = if key_questions.is_empty() {
        "- (none provided)".to_string()
    } else {
        key_questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are a research supervisor. Today is {date}.\n\n\
         Research brief:\n{research_brief}\n\n\
         Key questions:\n{questions}\n\n\
         Break the brief into focused sub-topics and delegate each with \
         conduct_research. Run at most {max_concurrent_agents} sub-agents at a \
         time and finish within {max_iterations} rounds. When the findings \
         cover the brief, call research_complete with a closing summary.\n\n\
         {tools}",
        date = Utc::now().format("%Y-%m-%d"),
        tools = tool_prompt_block(),
    )
}

/// Phase 3: a sub-agent's system prompt for one topic.
pub fn subagent_system(topic: &str) -> String {
    format!(
        "You are a research sub-agent focused on one topic:\n\n\
         \"{topic}\"\n\n\
         Use web_search and scholar_search to gather evidence (news_search \
         and doc_search where they fit), then reply with a structured summary \
         of what you found: key facts, sources, and open questions. \
         conduct_research is not available to you.\n\n\
         {tools}",
        tools = tool_prompt_block(),
    )
}

/// Compression pass when a sub-agent hits its iteration cap.
pub fn compress(topic: &str, transcript: &str) -> String {
    format!(
        "The following is a research conversation about \"{topic}\" that ran \
         out of iterations. Distill it into a structured summary of the \
         topic: key findings, sources mentioned, and anything still unknown.\n\n\
         {transcript}"
    )
}

/// Phase 4: the final report prompt.
pub fn report(research_brief: &str, findings: &str) -> String {
    format!(
        "Today is {date}. Write a comprehensive research report.\n\n\
         Research brief:\n{research_brief}\n\n\
         Findings:\n{findings}\n\n\
         Structure the report with exactly these sections:\n\
         # Research Report\n\
         ## Executive Summary\n\
         ## Detailed Analysis\n\
         ## Key Insights\n\
         ## Practical Recommendations\n\
         ## Conclusion",
        date = Utc::now().format("%Y-%m-%d"),
    )
}
