//! Formatting search results for the LM conversation.
//!
//! Results flow back to the model as Markdown-like blocks with a fixed
//! shape so prompts stay deterministic. At most eight results are shown in
//! full; the remainder is summarized in a trailing note. Empty result sets
//! always produce an explicit "No ... results found" string.

use deepscout_search::SearchResult;

/// Results shown in full per tool call.
const MAX_SHOWN: usize = 8;

/// Render a result batch for the conversation.
///
/// `kind` is the human-readable category ("Web", "Scholar", ...).
pub fn format_results(kind: &str, query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No {} results found for \"{}\".", kind.to_lowercase(), query);
    }

    let mut out = format!("## {} Search Results ({} found)\n\n", kind, results.len());

    for (i, result) in results.iter().take(MAX_SHOWN).enumerate() {
        out.push_str(&format!("{}. **{}**\n", i + 1, result.title));
        out.push_str(&format!("   URL: {}\n", result.url));
        out.push_str(&format!("   Source: {}\n", result.source));
        out.push_str(&format!(
            "   Relevance: {:.0}%\n",
            result.relevance_score * 100.0
        ));
        if !result.snippet.is_empty() {
            out.push_str(&format!("   {}\n", result.snippet));
        }
        out.push('\n');
    }

    if results.len() > MAX_SHOWN {
        out.push_str(&format!(
            "...and {} more results not shown.\n",
            results.len() - MAX_SHOWN
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(i: usize) -> SearchResult {
        SearchResult::new(
            format!("Result {i}"),
            format!("https://example.com/{i}"),
            format!("snippet {i}"),
            "google",
        )
        .with_score(0.8)
    }

    #[test]
    fn test_header_and_numbering() {
        let results: Vec<SearchResult> = (0..3).map(result).collect();
        let text = format_results("Web", "rust", &results);
        assert!(text.starts_with("## Web Search Results (3 found)"));
        assert!(text.contains("1. **Result 0**"));
        assert!(text.contains("3. **Result 2**"));
        assert!(text.contains("Relevance: 80%"));
    }

    #[test]
    fn test_truncates_to_eight_with_trailing_note() {
        let results: Vec<SearchResult> = (0..12).map(result).collect();
        let text = format_results("Scholar", "q", &results);
        assert!(text.contains("(12 found)"));
        assert!(text.contains("8. **Result 7**"));
        assert!(!text.contains("9. **Result 8**"));
        assert!(text.contains("...and 4 more results not shown."));
    }

    #[test]
    fn test_empty_results_are_explicit() {
        let text = format_results("News", "obscure topic", &[]);
        assert_eq!(text, "No news results found for \"obscure topic\".");
    }

    #[test]
    fn test_empty_snippet_line_omitted() {
        let result = SearchResult::new("T", "https://e.com", "", "duckduckgo");
        let text = format_results("Web", "q", &[result]);
        assert!(text.contains("Source: duckduckgo"));
        assert!(!text.contains("\n   \n"));
    }
}
