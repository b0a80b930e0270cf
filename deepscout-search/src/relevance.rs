//! Lexical relevance scoring for providers without native scores.

/// Score a result's relevance to a query using lexical overlap.
///
/// Starts at 0 and accumulates: 0.5 if the whole query appears in the
/// title, 0.3 if it appears in the snippet, then +0.1 / +0.05 per query
/// word longer than two characters found in the title / snippet. The
/// result is clamped to [0, 1]. All comparisons are case-insensitive.
pub fn lexical_relevance(query: &str, title: &str, snippet: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let title_lower = title.to_lowercase();
    let snippet_lower = snippet.to_lowercase();

    let mut score: f64 = 0.0;

    if title_lower.contains(&query_lower) {
        score += 0.5;
    }
    if snippet_lower.contains(&query_lower) {
        score += 0.3;
    }

    for word in query_lower.split_whitespace().filter(|w| w.len() > 2) {
        if title_lower.contains(word) {
            score += 0.1;
        }
        if snippet_lower.contains(word) {
            score += 0.05;
        }
    }

    score.clamp(0.0, 1.0)
}
