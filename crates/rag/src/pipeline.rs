//! Run orchestration: question in, cited answer out.
//!
//! Stages run strictly in sequence. Only page fetches run concurrently.

use clisearch_core::{AppConfig, AppError, AppResult, CredentialPolicy};
use clisearch_web::{extract_passage, fetch_all, ExtractedPassage, PageFetcher, SearchClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::context::assemble_context;
use crate::dedup::deduplicate;
use crate::strategy::{AnswerGenerator, AnswerStrategy, QueryRewriter, TemplateFallback};
use crate::types::{Answer, RunReport, RunStage};

/// Limits and policy for a run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_results: usize,
    pub per_source_chars: usize,
    pub budget_chars: usize,
    pub snippet_count: usize,
    pub dedupe_text: bool,
    pub fetch_timeout: Duration,
    pub credential_policy: CredentialPolicy,
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_results: config.search.max_results,
            per_source_chars: config.context.per_source_chars,
            budget_chars: config.context.budget_chars,
            snippet_count: config.context.snippet_count,
            dedupe_text: config.context.dedupe_text,
            fetch_timeout: Duration::from_secs(config.fetch.timeout_secs),
            credential_policy: config.credential_policy,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub answer: Answer,
    pub queries: Vec<String>,
    pub report: RunReport,
}

/// Search, fetch, deduplicate, assemble and answer.
pub struct SearchPipeline {
    search: SearchClient,
    fetcher: Arc<dyn PageFetcher>,
    strategy: AnswerStrategy,
    options: PipelineOptions,
}

fn log_stage(stage: RunStage) {
    tracing::info!(stage = %stage, "Run stage: {}", stage);
}

impl SearchPipeline {
    pub fn new(
        search: SearchClient,
        fetcher: Arc<dyn PageFetcher>,
        strategy: AnswerStrategy,
        options: PipelineOptions,
    ) -> Self {
        Self {
            search,
            fetcher,
            strategy,
            options,
        }
    }

    pub fn strategy(&self) -> &AnswerStrategy {
        &self.strategy
    }

    /// Answer `question`.
    ///
    /// Per-item failures (one search, one page) are absorbed. An error is
    /// returned only for an empty question or, under the strict policy, a
    /// failed model answer.
    pub async fn run(&self, question: &str) -> AppResult<PipelineOutcome> {
        let span = tracing::info_span!("run", strategy = self.strategy.name());
        self.run_stages(question).instrument(span).await
    }

    async fn run_stages(&self, question: &str) -> AppResult<PipelineOutcome> {
        let question = question.trim();
        if question.is_empty() {
            log_stage(RunStage::Failed);
            return Err(AppError::Other("Question must not be empty".to_string()));
        }

        log_stage(RunStage::Start);
        let mut report = RunReport::default();

        let queries = self.strategy.rewrite(question).await;
        report.queries = queries.len();
        tracing::info!("Generated {} search queries: {:?}", queries.len(), queries);
        log_stage(RunStage::QueryGenerated);

        let results = self
            .search
            .search_all(&queries, self.options.max_results)
            .await;
        report.results_found = results.len();
        tracing::info!("Found {} search results", results.len());
        log_stage(RunStage::SearchPerformed);

        let documents =
            fetch_all(self.fetcher.as_ref(), results, self.options.fetch_timeout).await;
        report.pages_fetched = documents.iter().filter(|d| d.fetched()).count();
        tracing::info!(
            "Fetched {} of {} pages",
            report.pages_fetched,
            documents.len()
        );
        log_stage(RunStage::ContentFetched);

        let passages: Vec<ExtractedPassage> = documents
            .into_iter()
            .map(|doc| extract_passage(doc, self.options.per_source_chars))
            .collect();
        let passages = deduplicate(passages, self.options.dedupe_text);
        report.passages_kept = passages.len();
        tracing::info!("Kept {} passages after deduplication", passages.len());
        log_stage(RunStage::Deduplicated);

        let context = assemble_context(&passages, self.options.budget_chars);
        report.context_chars = context.char_len();
        tracing::info!(
            "Assembled context with {} sources ({} chars)",
            context.entries().len(),
            context.char_len()
        );
        log_stage(RunStage::ContextAssembled);

        let answer = match self.strategy.generate(question, &context, &passages).await {
            Ok(answer) => answer,
            Err(e) if self.options.credential_policy == CredentialPolicy::Lenient => {
                tracing::warn!("Answer generation failed, using search results instead: {}", e);
                TemplateFallback::new(self.options.snippet_count).compose(question, &passages)
            }
            Err(e) => {
                log_stage(RunStage::Failed);
                return Err(e);
            }
        };
        tracing::info!(
            "Answer ready (mode: {}, {} sources cited)",
            answer.mode,
            answer.cited_sources.len()
        );
        log_stage(RunStage::AnswerGenerated);

        log_stage(RunStage::Done);
        Ok(PipelineOutcome {
            answer,
            queries,
            report,
        })
    }
}
