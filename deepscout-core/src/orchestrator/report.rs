//! Phase 4: final report generation.
//!
//! One LM call over the brief and the joined notes. If phase 3 gathered
//! no notes, or the model is unavailable, a deterministic fallback report
//! is assembled from the raw notes instead, so a successful run always
//! carries a non-empty report and never presents LM prose as grounded
//! findings when there are none.

use super::{prompts, DeepResearcher};
use crate::types::ResearchState;
use tracing::warn;

impl DeepResearcher {
    pub(super) async fn write_report(&self, state: &ResearchState) -> String {
        if state.notes.is_empty() {
            warn!("No research notes were gathered; using fallback report");
            return fallback_report(state);
        }

        let findings = state.notes.join("\n\n");
        let prompt = prompts::report(&state.research_brief, &findings);

        match self.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Report call returned empty text; using fallback report");
                fallback_report(state)
            }
            Err(err) => {
                warn!(error = %err, "Report call failed; using fallback report");
                fallback_report(state)
            }
        }
    }
}

/// Deterministic report built from raw notes.
pub(super) fn fallback_report(state: &ResearchState) -> String {
    let mut out = String::from("# Research Report\n\n");
    if !state.research_brief.is_empty() {
        out.push_str(&format!("**Research brief:** {}\n\n", state.research_brief));
    }
    out.push_str("## Findings Summary\n\n");
    if state.raw_notes.is_empty() {
        out.push_str("No research notes were collected.\n");
    } else {
        for note in &state.raw_notes {
            out.push_str(note);
            out.push_str("\n\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LmError;
    use crate::lm::MockLmProvider;
    use crate::orchestrator::tests::test_researcher;

    fn state_with_notes() -> ResearchState {
        let mut state = ResearchState::new("q");
        state.research_brief = "the brief".into();
        state.notes.push("note one".into());
        state
            .raw_notes
            .push("Research on: topic\nnote one".into());
        state
    }

    #[tokio::test]
    async fn test_report_uses_lm_text() {
        let mock = MockLmProvider::new();
        mock.queue_text("# Research Report\n## Executive Summary\n...\n## Conclusion\n...");
        let researcher = test_researcher(mock);

        let report = researcher.write_report(&state_with_notes()).await;
        assert!(report.contains("Executive Summary"));
    }

    #[tokio::test]
    async fn test_lm_failure_yields_fallback() {
        let mock = MockLmProvider::new();
        mock.queue_error(LmError::ApiRequest {
            message: "503".into(),
        });
        let researcher = test_researcher(mock);

        let report = researcher.write_report(&state_with_notes()).await;
        assert!(report.starts_with("# Research Report"));
        assert!(report.contains("## Findings Summary"));
        assert!(report.contains("note one"));
    }

    #[tokio::test]
    async fn test_empty_notes_force_fallback_even_when_lm_succeeds() {
        let mock = MockLmProvider::new();
        mock.queue_text("# A confident report with nothing behind it");
        let researcher = test_researcher(mock);

        let mut state = ResearchState::new("q");
        state.research_brief = "the brief".into();
        let report = researcher.write_report(&state).await;

        assert!(report.starts_with("# Research Report"));
        assert!(report.contains("No research notes were collected."));
        assert!(!report.contains("confident report"));
    }

    #[test]
    fn test_fallback_report_without_notes() {
        let state = ResearchState::new("q");
        let report = fallback_report(&state);
        assert!(report.starts_with("# Research Report"));
        assert!(report.contains("No research notes were collected."));
    }
}
