//! Answering pipeline for cli-search.
//!
//! Rewrites a question into queries, searches, fetches and extracts result
//! pages, deduplicates them, assembles a bounded context and produces a
//! cited answer with a language model or a template fallback.

pub mod citations;
pub mod context;
pub mod dedup;
pub mod pipeline;
pub mod strategy;
pub mod types;

#[cfg(test)]
mod tests;

pub use citations::{cited_sources, parse_citations};
pub use context::assemble_context;
pub use dedup::{deduplicate, normalize_url};
pub use pipeline::{PipelineOptions, PipelineOutcome, SearchPipeline};
pub use strategy::{
    parse_query_lines, AnswerGenerator, AnswerStrategy, ModelBacked, QueryRewriter,
    TemplateFallback,
};
pub use types::{Answer, AnswerMode, ContextBlock, ContextEntry, RunReport, RunStage};
