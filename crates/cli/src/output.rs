//! Answer rendering for stdout.

use clisearch_core::AppResult;
use clisearch_rag::{Answer, AnswerMode, PipelineOutcome, RunReport};
use clisearch_web::SearchResult;
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    answer: &'a str,
    mode: AnswerMode,
    sources: &'a [SearchResult],
    queries: &'a [String],
    report: &'a RunReport,
}

/// Answer text followed by a numbered `Sources:` list when anything is cited.
pub fn render_text(answer: &Answer) -> String {
    let mut out = answer.text.clone();

    if !answer.cited_sources.is_empty() {
        out.push_str("\n\nSources:");
        for (i, source) in answer.cited_sources.iter().enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, source.url));
        }
    }

    out
}

/// Pretty-printed JSON with the answer, sources, queries and run report.
pub fn render_json(outcome: &PipelineOutcome) -> AppResult<String> {
    let output = JsonOutput {
        answer: &outcome.answer.text,
        mode: outcome.answer.mode,
        sources: &outcome.answer.cited_sources,
        queries: &outcome.queries,
        report: &outcome.report,
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(sources: Vec<SearchResult>) -> Answer {
        Answer::new("Paris is the capital [1].", sources, AnswerMode::Model)
    }

    #[test]
    fn test_render_text_with_sources() {
        let rendered = render_text(&answer(vec![
            SearchResult::new("A", "https://a.com", "a"),
            SearchResult::new("B", "https://b.com", "b"),
        ]));

        assert_eq!(
            rendered,
            "Paris is the capital [1].\n\nSources:\n1. https://a.com\n2. https://b.com"
        );
    }

    #[test]
    fn test_render_text_omits_empty_sources() {
        let rendered = render_text(&Answer::no_results("q"));
        assert!(!rendered.contains("Sources:"));
    }

    #[test]
    fn test_render_json_shape() {
        let outcome = PipelineOutcome {
            answer: answer(vec![SearchResult::new("A", "https://a.com", "snippet")]),
            queries: vec!["capital of France".to_string()],
            report: RunReport {
                queries: 1,
                results_found: 3,
                pages_fetched: 2,
                passages_kept: 2,
                context_chars: 120,
            },
        };

        let json: serde_json::Value = serde_json::from_str(&render_json(&outcome).unwrap()).unwrap();

        assert_eq!(json["answer"], "Paris is the capital [1].");
        assert_eq!(json["mode"], "model");
        assert_eq!(json["sources"][0]["url"], "https://a.com");
        assert_eq!(json["sources"][0]["snippet"], "snippet");
        assert_eq!(json["queries"][0], "capital of France");
        assert_eq!(json["report"]["pages_fetched"], 2);
    }
}
