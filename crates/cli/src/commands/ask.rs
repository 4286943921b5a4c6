//! Ask command handler.
//!
//! Wires the configured search provider, page fetcher and answer strategy
//! into a pipeline, runs it once and prints the answer to stdout.

use clap::Args;
use clisearch_core::{config::AppConfig, AppError, AppResult};
use clisearch_rag::{AnswerStrategy, PipelineOptions, SearchPipeline};
use clisearch_web::{
    build_fetch_client, build_search_client, DuckDuckGoProvider, HttpFetcher, SearchClient,
};
use std::sync::Arc;

use crate::output;

/// Answer a question from web search results
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Maximum number of search results to fetch
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Fail instead of falling back when no language model is usable
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// The question as a single string.
    pub fn question(&self) -> String {
        self.question.join(" ")
    }

    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question();
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        // Fails here, before any network I/O, under the strict policy
        let strategy = AnswerStrategy::from_config(config)?;
        tracing::info!("Answer strategy: {}", strategy.name());

        let search_http = build_search_client(&config.search)?;
        let provider = DuckDuckGoProvider::new(
            search_http,
            config.search.endpoint.clone(),
            config.search.timeout_secs.saturating_mul(1000),
        );

        let fetch_http = build_fetch_client(&config.fetch)?;
        let fetcher = HttpFetcher::new(fetch_http, config.fetch.max_body_bytes);

        let pipeline = SearchPipeline::new(
            SearchClient::new(Arc::new(provider)),
            Arc::new(fetcher),
            strategy,
            PipelineOptions::from_config(config),
        );

        let outcome = pipeline.run(&question).await?;

        let rendered = if self.json {
            output::render_json(&outcome)?
        } else {
            output::render_text(&outcome.answer)
        };
        println!("{}", rendered);

        Ok(())
    }
}
