//! Answer, context and run report types.

use clisearch_web::SearchResult;
use serde::Serialize;
use std::fmt;

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Synthesized by a language model from the context block
    Model,
    /// Built from search snippets without a model
    Template,
    /// Nothing usable was found
    NoResults,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerMode::Model => "model",
            AnswerMode::Template => "template",
            AnswerMode::NoResults => "no_results",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final answer of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,

    /// Sources backing the answer, unique by normalized URL
    pub cited_sources: Vec<SearchResult>,

    pub mode: AnswerMode,
}

impl Answer {
    pub fn new(text: impl Into<String>, cited_sources: Vec<SearchResult>, mode: AnswerMode) -> Self {
        Self {
            text: text.into(),
            cited_sources,
            mode,
        }
    }

    /// Answer for a run where no passage survived.
    pub fn no_results(question: &str) -> Self {
        Self {
            text: format!(
                "I could not find any web results about \"{}\".",
                question
            ),
            cited_sources: Vec::new(),
            mode: AnswerMode::NoResults,
        }
    }
}

/// One numbered source inside a [`ContextBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    /// 1-based citation index
    pub index: usize,
    pub source: SearchResult,
    /// Text as included in the block, possibly truncated
    pub text: String,
}

/// Indexed source text handed to the answer step.
///
/// The rendered form never exceeds `budget` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    entries: Vec<ContextEntry>,
    budget: usize,
    rendered: String,
    char_len: usize,
}

impl ContextBlock {
    pub(crate) fn new(entries: Vec<ContextEntry>, budget: usize, rendered: String) -> Self {
        let char_len = rendered.chars().count();
        Self {
            entries,
            budget,
            rendered,
            char_len,
        }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// Look up an entry by its citation index.
    pub fn entry(&self, index: usize) -> Option<&ContextEntry> {
        index
            .checked_sub(1)
            .and_then(|position| self.entries.get(position))
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Rendered length in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Diagnostic summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Number of search queries issued
    pub queries: usize,
    /// Merged search results before fetching
    pub results_found: usize,
    /// Pages fetched successfully
    pub pages_fetched: usize,
    /// Passages left after deduplication
    pub passages_kept: usize,
    /// Rendered context length in characters
    pub context_chars: usize,
}

/// Stages of a run, logged as the pipeline advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    QueryGenerated,
    SearchPerformed,
    ContentFetched,
    Deduplicated,
    ContextAssembled,
    AnswerGenerated,
    Done,
    Failed,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Start => "start",
            RunStage::QueryGenerated => "query_generated",
            RunStage::SearchPerformed => "search_performed",
            RunStage::ContentFetched => "content_fetched",
            RunStage::Deduplicated => "deduplicated",
            RunStage::ContextAssembled => "context_assembled",
            RunStage::AnswerGenerated => "answer_generated",
            RunStage::Done => "done",
            RunStage::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
