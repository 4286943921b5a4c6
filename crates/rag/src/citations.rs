//! Inline citation parsing: `[1]`, `[1, 3]`, `[1][2]`.

use clisearch_web::SearchResult;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::dedup::normalize_url;
use crate::types::ContextBlock;

lazy_static! {
    static ref CITATION_PATTERN: Regex =
        Regex::new(r"\[\s*(\d+(?:\s*,\s*\d+)*)\s*\]").expect("citation pattern is valid");
}

/// Citation indices in order of first appearance, without repeats.
pub fn parse_citations(text: &str) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut indices = Vec::new();

    for captures in CITATION_PATTERN.captures_iter(text) {
        let Some(group) = captures.get(1) else {
            continue;
        };
        for number in group.as_str().split(',') {
            if let Ok(index) = number.trim().parse::<usize>() {
                if seen.insert(index) {
                    indices.push(index);
                }
            }
        }
    }

    indices
}

/// Sources referenced by `text`, in first-citation order.
///
/// Indices without a context entry are ignored. Sources are unique by
/// normalized URL.
pub fn cited_sources(text: &str, context: &ContextBlock) -> Vec<SearchResult> {
    let mut seen = HashSet::new();

    parse_citations(text)
        .into_iter()
        .filter_map(|index| context.entry(index))
        .filter(|entry| seen.insert(normalize_url(&entry.source.url)))
        .map(|entry| entry.source.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::assemble_context;
    use clisearch_web::ExtractedPassage;

    #[test]
    fn test_parse_single_grouped_and_adjacent() {
        assert_eq!(parse_citations("Paris [1]."), vec![1]);
        assert_eq!(parse_citations("Both agree [1, 3]."), vec![1, 3]);
        assert_eq!(parse_citations("Adjacent [2][1] and again [2]."), vec![2, 1]);
        assert_eq!(parse_citations("Spaced [ 4 ,5 ]"), vec![4, 5]);
    }

    #[test]
    fn test_citation_pattern_compiles_once() {
        lazy_static::initialize(&CITATION_PATTERN);
        assert!(CITATION_PATTERN.is_match("[1]"));
        assert_eq!(parse_citations("[7]"), parse_citations("again [7]"));
    }

    #[test]
    fn test_parse_ignores_non_citations() {
        assert!(parse_citations("No citations here").is_empty());
        assert!(parse_citations("Array [a] or [] or [1a]").is_empty());
    }

    #[test]
    fn test_cited_sources_maps_and_ignores_unknown() {
        let passages = vec![
            ExtractedPassage::new(SearchResult::new("A", "https://a.com", ""), "alpha"),
            ExtractedPassage::new(SearchResult::new("B", "https://b.com", ""), "bravo"),
        ];
        let context = assemble_context(&passages, 6000);

        let sources = cited_sources("Claim [2]. Other [7]. Again [2, 1].", &context);
        let urls: Vec<_> = sources.iter().map(|s| s.url.as_str()).collect();

        assert_eq!(urls, vec!["https://b.com", "https://a.com"]);
    }

    #[test]
    fn test_cited_sources_zero_index_ignored() {
        let passages = vec![ExtractedPassage::new(
            SearchResult::new("A", "https://a.com", ""),
            "alpha",
        )];
        let context = assemble_context(&passages, 6000);

        assert!(cited_sources("Nothing [0]", &context).is_empty());
    }
}
