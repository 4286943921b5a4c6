//! Context block assembly within a character budget.

use clisearch_web::{truncate_chars, ExtractedPassage};

use crate::types::{ContextBlock, ContextEntry};

/// Separator between rendered entries; counts against the budget.
pub const ENTRY_SEPARATOR: &str = "\n\n";

fn entry_header(index: usize, passage: &ExtractedPassage) -> String {
    format!(
        "[{}] {}\nURL: {}\n",
        index, passage.source.title, passage.source.url
    )
}

/// Assemble passages into a numbered context block.
///
/// Passages keep their order and get consecutive 1-based indices; empty ones
/// are skipped. The first passage that does not fit is truncated (or dropped
/// when not even its header fits) and assembly stops there, so the rendered
/// block never exceeds `budget` characters.
pub fn assemble_context(passages: &[ExtractedPassage], budget: usize) -> ContextBlock {
    let separator_len = ENTRY_SEPARATOR.chars().count();
    let mut entries: Vec<ContextEntry> = Vec::new();
    let mut rendered = String::new();
    let mut used = 0;

    for passage in passages.iter().filter(|p| !p.text.trim().is_empty()) {
        let index = entries.len() + 1;
        let separator = if entries.is_empty() { 0 } else { separator_len };
        let header = entry_header(index, passage);
        let fixed = separator + header.chars().count();

        let remaining = budget.saturating_sub(used);
        if fixed >= remaining {
            tracing::debug!("Context budget exhausted before source {}", passage.source.url);
            break;
        }

        let available = remaining - fixed;
        let text_len = passage.text.chars().count();
        let truncated = text_len > available;
        let text = if truncated {
            truncate_chars(&passage.text, available)
        } else {
            passage.text.clone()
        };

        if text.is_empty() {
            break;
        }

        if separator > 0 {
            rendered.push_str(ENTRY_SEPARATOR);
        }
        rendered.push_str(&header);
        rendered.push_str(&text);
        used += fixed + text.chars().count();

        entries.push(ContextEntry {
            index,
            source: passage.source.clone(),
            text,
        });

        if truncated {
            tracing::debug!("Truncated source {} to fit the context budget", index);
            break;
        }
    }

    ContextBlock::new(entries, budget, rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clisearch_web::SearchResult;

    fn passage(title: &str, url: &str, text: &str) -> ExtractedPassage {
        ExtractedPassage::new(SearchResult::new(title, url, ""), text)
    }

    #[test]
    fn test_assemble_renders_numbered_entries() {
        let passages = vec![
            passage("Paris", "https://a.com", "Paris is the capital of France."),
            passage("Empty", "https://empty.com", "   "),
            passage("France", "https://b.com", "France is in Europe."),
        ];

        let block = assemble_context(&passages, 6000);

        assert_eq!(
            block.rendered(),
            "[1] Paris\nURL: https://a.com\nParis is the capital of France.\n\n\
             [2] France\nURL: https://b.com\nFrance is in Europe."
        );
        assert_eq!(block.entries().len(), 2);
        assert_eq!(block.entries()[1].index, 2);
        assert_eq!(block.char_len(), block.rendered().chars().count());
    }

    #[test]
    fn test_assemble_truncates_last_fitting_passage() {
        let passages = vec![
            passage("A", "https://a.com", &"alpha ".repeat(10)),
            passage("B", "https://b.com", &"bravo ".repeat(50)),
            passage("C", "https://c.com", "never included"),
        ];

        let block = assemble_context(&passages, 150);

        assert!(block.char_len() <= 150);
        assert_eq!(block.entries().len(), 2);
        assert!(block.entries()[1].text.len() < passages[1].text.len());
        assert!(!block.rendered().contains("never included"));
    }

    #[test]
    fn test_assemble_single_passage_larger_than_budget() {
        let passages = vec![passage("Huge", "https://huge.com", &"x".repeat(10_000))];

        let block = assemble_context(&passages, 100);

        assert!(block.char_len() <= 100);
        assert_eq!(block.entries().len(), 1);
    }

    #[test]
    fn test_assemble_drops_passage_when_header_does_not_fit() {
        let passages = vec![
            passage("A", "https://a.com", "short text"),
            passage("A much longer title", "https://example.com/long/path", "text"),
        ];

        let first_len = "[1] A\nURL: https://a.com\nshort text".chars().count();
        let block = assemble_context(&passages, first_len + 10);

        assert_eq!(block.entries().len(), 1);
        assert_eq!(block.char_len(), first_len);
    }

    #[test]
    fn test_assemble_budget_holds_for_many_sizes() {
        let passages: Vec<_> = (0..8)
            .map(|i| passage("Titre é", &format!("https://s{}.com", i), &"mot é ".repeat(i * 20 + 1)))
            .collect();

        for budget in [0, 1, 10, 40, 100, 250, 600, 2000] {
            let block = assemble_context(&passages, budget);
            assert!(block.char_len() <= budget, "budget {} exceeded", budget);
        }
    }

    #[test]
    fn test_assemble_empty_input() {
        let block = assemble_context(&[], 6000);
        assert!(block.is_empty());
        assert_eq!(block.rendered(), "");
    }
}
