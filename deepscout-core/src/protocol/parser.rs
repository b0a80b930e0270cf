//! Permissive parsing of LM text into typed tool calls.
//!
//! Models frequently describe a call instead of emitting the canonical
//! syntax, so three complementary patterns are scanned in order:
//! an explicit `USE_TOOL: name(args)` marker, a bare `name(args)` for
//! catalog names, and a `name: argument line` form. Spans consumed by an
//! earlier pattern are not re-parsed by a later one.
//!
//! When nothing parses but the text clearly intends to research, the
//! forced-progress guard synthesizes a single `web_search` call so the
//! agent loop cannot stall on a descriptive response.

use super::catalog::{conventional_arg, is_catalog_tool};
use crate::error::ProtocolError;
use crate::types::ToolCall;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

const CATALOG_ALTERNATION: &str =
    "web_search|scholar_search|news_search|doc_search|think|conduct_research|research_complete";

fn use_tool_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"USE_TOOL:\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)").expect("static regex")
    })
}

fn bare_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"\b({CATALOG_ALTERNATION})\s*\(([^)]*)\)")).expect("static regex")
    })
}

fn colon_form_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?m)^\s*({CATALOG_ALTERNATION})\s*:\s*(.+)$")).expect("static regex")
    })
}

/// Words stripped when synthesizing a query from descriptive text.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "from", "into", "about", "will", "would",
    "should", "could", "need", "needs", "want", "wants", "let", "lets", "now", "then", "more",
    "some", "start", "begin", "first", "next", "going", "research", "researching", "search",
    "searching", "searches", "look", "find", "information", "topic", "topics",
];

/// Parse all tool calls out of an assistant message.
///
/// Applies the forced-progress guard: if no pattern matches but the text
/// mentions research or search, exactly one synthesized `web_search` call
/// is returned.
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for cap in use_tool_regex().captures_iter(text) {
        let whole = cap.get(0).expect("match");
        if let Some(call) = build_call(&cap[1], &cap[2]) {
            spans.push((whole.start(), whole.end()));
            calls.push(call);
        }
    }

    for cap in bare_call_regex().captures_iter(text) {
        let whole = cap.get(0).expect("match");
        if overlaps(&spans, whole.start(), whole.end()) {
            continue;
        }
        if let Some(call) = build_call(&cap[1], &cap[2]) {
            spans.push((whole.start(), whole.end()));
            calls.push(call);
        }
    }

    for cap in colon_form_regex().captures_iter(text) {
        let whole = cap.get(0).expect("match");
        if overlaps(&spans, whole.start(), whole.end()) {
            continue;
        }
        if let Some(call) = build_call(&cap[1], &cap[2]) {
            spans.push((whole.start(), whole.end()));
            calls.push(call);
        }
    }

    if calls.is_empty() {
        if let Some(forced) = forced_progress_call(text) {
            calls.push(forced);
        }
    }

    calls
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

/// Build a call from a matched name and raw argument text, or drop it.
fn build_call(name: &str, raw_args: &str) -> Option<ToolCall> {
    match parse_arguments(name, raw_args) {
        Ok(arguments) => Some(ToolCall::new(name, arguments)),
        Err(err) => {
            debug!(tool = name, error = %err, "Rejected malformed tool call");
            None
        }
    }
}

/// Argument binding rules, in order: a single quoted string binds to the
/// tool's conventional parameter; a JSON object is taken as-is (and must
/// contain the required argument for catalog tools); anything else is
/// treated as a bare query string.
fn parse_arguments(name: &str, raw_args: &str) -> Result<Map<String, Value>, ProtocolError> {
    let trimmed = raw_args.trim();
    // Unknown tools keep their raw argument under a generic key; the
    // dispatcher answers them with an "Unknown tool" message regardless.
    let arg_name = conventional_arg(name).unwrap_or("query");

    if trimmed.is_empty() {
        if is_catalog_tool(name) {
            return Err(ProtocolError::MissingArgument {
                tool: name.to_string(),
                argument: arg_name.to_string(),
            });
        }
        return Ok(Map::new());
    }

    if let Some(unquoted) = strip_matching_quotes(trimmed) {
        let mut map = Map::new();
        map.insert(arg_name.to_string(), Value::String(unquoted.to_string()));
        return Ok(map);
    }

    if trimmed.starts_with('{') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            if is_catalog_tool(name) && !map.contains_key(arg_name) {
                return Err(ProtocolError::MissingArgument {
                    tool: name.to_string(),
                    argument: arg_name.to_string(),
                });
            }
            return Ok(map);
        }
    }

    // Bare (unquoted, non-JSON) argument: treat the whole text as the value.
    let mut map = Map::new();
    map.insert(
        arg_name.to_string(),
        Value::String(trimmed.trim_matches(|c| c == '"' || c == '\'').to_string()),
    );
    Ok(map)
}

fn strip_matching_quotes(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}

/// Synthesize one `web_search` call from descriptive text that mentions
/// research or search but invokes nothing.
fn forced_progress_call(text: &str) -> Option<ToolCall> {
    let lower = text.to_lowercase();
    if !lower.contains("research") && !lower.contains("search") {
        return None;
    }

    let line = text
        .lines()
        .find(|line| {
            let l = line.to_lowercase();
            l.contains("research") || l.contains("search")
        })?
        .trim();

    let query = extract_query_tokens(line);
    if query.is_empty() {
        return None;
    }

    debug!(query, "Forced-progress guard synthesized a web_search call");
    let mut arguments = Map::new();
    arguments.insert("query".to_string(), Value::String(query));
    Some(ToolCall::new("web_search", arguments))
}

/// Up to three significant tokens from a line; stopwords and short words
/// filtered first, with progressively weaker filters if nothing survives.
fn extract_query_tokens(line: &str) -> String {
    let tokens: Vec<String> = line
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    let significant: Vec<&String> = tokens
        .iter()
        .filter(|t| t.len() > 2 && !STOPWORDS.contains(&t.as_str()))
        .take(3)
        .collect();
    if !significant.is_empty() {
        return significant
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
    }

    tokens
        .iter()
        .filter(|t| t.len() > 2)
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_use_tool_marker() {
        let calls = parse_tool_calls(r#"USE_TOOL: web_search("rust async runtimes")"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "web_search");
        assert_eq!(calls[0].arg_str("query"), Some("rust async runtimes"));
    }

    #[test]
    fn test_bare_call_form() {
        let calls = parse_tool_calls(r#"I'll start with scholar_search("attention mechanisms")."#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "scholar_search");
        assert_eq!(calls[0].arg_str("query"), Some("attention mechanisms"));
    }

    #[test]
    fn test_colon_line_form() {
        let calls = parse_tool_calls("conduct_research: history of transformer models");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "conduct_research");
        assert_eq!(
            calls[0].arg_str("research_topic"),
            Some("history of transformer models")
        );
    }

    #[test]
    fn test_use_tool_span_not_double_parsed() {
        // The bare pattern would also match inside the USE_TOOL span.
        let calls = parse_tool_calls(r#"USE_TOOL: web_search("just one call")"#);
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_multiple_calls_in_order() {
        let text = r#"
USE_TOOL: web_search("topic one")
USE_TOOL: scholar_search("topic two")
USE_TOOL: research_complete("done")
"#;
        let calls = parse_tool_calls(text);
        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["web_search", "scholar_search", "research_complete"]);
    }

    #[test]
    fn test_json_object_arguments() {
        let calls =
            parse_tool_calls(r#"USE_TOOL: doc_search({"query": "channels", "library": "tokio"})"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arg_str("query"), Some("channels"));
        assert_eq!(calls[0].arg_str("library"), Some("tokio"));
    }

    #[test]
    fn test_json_missing_required_argument_rejected() {
        let calls = parse_tool_calls(r#"USE_TOOL: doc_search({"library": "tokio"})"#);
        assert!(calls.is_empty() || calls[0].name == "web_search");
        // No doc_search call survives without its query.
        assert!(!calls.iter().any(|c| c.name == "doc_search"));
    }

    #[test]
    fn test_empty_arguments_rejected_for_catalog_tools() {
        // "search" in the text triggers the guard instead, proving the
        // empty-argument call itself was rejected.
        let calls = parse_tool_calls("web_search()");
        assert!(!calls
            .iter()
            .any(|c| c.name == "web_search" && c.arg_str("query").is_none()));
    }

    #[test]
    fn test_unquoted_argument_treated_as_query() {
        let calls = parse_tool_calls("USE_TOOL: news_search(quantum computing breakthroughs)");
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].arg_str("query"),
            Some("quantum computing breakthroughs")
        );
    }

    #[test]
    fn test_single_quoted_argument() {
        let calls = parse_tool_calls("USE_TOOL: think('weighing the evidence')");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arg_str("thoughts"), Some("weighing the evidence"));
    }

    #[test]
    fn test_unknown_tool_kept_for_dispatcher() {
        let calls = parse_tool_calls(r#"USE_TOOL: grep_files("main.rs")"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "grep_files");
    }

    #[test]
    fn test_fresh_ids_per_call() {
        let text = r#"USE_TOOL: web_search("a")
USE_TOOL: web_search("a")"#;
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].id, calls[1].id);
    }

    #[test]
    fn test_forced_progress_guard_fires() {
        let text = "I should research current developments in AI coordination before answering.";
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "web_search");
        let query = calls[0].arg_str("query").unwrap();
        assert!(!query.is_empty());
        assert!(query.split_whitespace().count() <= 3);
    }

    #[test]
    fn test_forced_progress_filters_stopwords() {
        let text = "Let me search for the latest quantum cryptography standards";
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        let query = calls[0].arg_str("query").unwrap();
        assert!(query.contains("quantum"));
        assert!(!query.contains("search"));
    }

    #[test]
    fn test_no_guard_without_trigger_words() {
        let calls = parse_tool_calls("The weather is nice today.");
        assert!(calls.is_empty());
    }

    #[test]
    fn test_plain_prose_with_parsed_call_no_guard() {
        let text = r#"I'll research this. USE_TOOL: web_search("topic")"#;
        let calls = parse_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arg_str("query"), Some("topic"));
    }
}
