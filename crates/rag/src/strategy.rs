//! Query rewriting and answer generation strategies.
//!
//! A run uses either a language model for both steps or a deterministic
//! template that needs no model at all. The choice is made once, from the
//! configuration, before any search happens.

use async_trait::async_trait;
use clisearch_core::{AppConfig, AppError, AppResult, CredentialPolicy};
use clisearch_llm::{create_client, LlmClient, LlmRequest};
use clisearch_prompt::{
    build_prompt, load_prompt, PromptDefinition, ANSWER_PROMPT_ID, REWRITE_PROMPT_ID,
};
use clisearch_web::{collapse_whitespace, truncate_chars, ExtractedPassage};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::citations::cited_sources;
use crate::types::{Answer, AnswerMode, ContextBlock};

lazy_static! {
    /// Leading list markers a model tends to add: `-`, `*`, `•`, `1.`, `1)`.
    static ref LIST_MARKER: Regex =
        Regex::new(r"^(?:[-*•]\s*|\d+[.)]\s+)").expect("list marker pattern is valid");
}

/// Characters shown per source in a template answer when the snippet is empty.
const TEMPLATE_EXCERPT_CHARS: usize = 300;

/// Turns a question into search queries.
///
/// Total: a failure degrades to the question itself.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, question: &str) -> Vec<String>;
}

/// Produces the final answer from the assembled context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        question: &str,
        context: &ContextBlock,
        passages: &[ExtractedPassage],
    ) -> AppResult<Answer>;
}

/// Strategy backed by a language model.
pub struct ModelBacked {
    client: Arc<dyn LlmClient>,
    model: String,
    rewrite_prompt: PromptDefinition,
    answer_prompt: PromptDefinition,
    max_queries: usize,
}

impl ModelBacked {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        rewrite_prompt: PromptDefinition,
        answer_prompt: PromptDefinition,
        max_queries: usize,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            rewrite_prompt,
            answer_prompt,
            max_queries,
        }
    }

    async fn request_queries(&self, question: &str) -> AppResult<Vec<String>> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("maxQueries".to_string(), self.max_queries.to_string());
        let prompt = build_prompt(&self.rewrite_prompt, vars)?;

        let mut request = LlmRequest::new(prompt.user, &self.model)
            .with_temperature(0.2)
            .with_max_tokens(200);
        if let Some(system) = prompt.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        Ok(parse_query_lines(&response.content, self.max_queries))
    }
}

#[async_trait]
impl QueryRewriter for ModelBacked {
    async fn rewrite(&self, question: &str) -> Vec<String> {
        match self.request_queries(question).await {
            Ok(queries) if !queries.is_empty() => {
                tracing::debug!("Rewrote question into {} queries", queries.len());
                queries
            }
            Ok(_) => {
                tracing::warn!("Query rewrite returned no usable queries; searching the question");
                vec![question.to_string()]
            }
            Err(e) => {
                tracing::warn!("Query rewrite failed, searching the question: {}", e);
                vec![question.to_string()]
            }
        }
    }
}

#[async_trait]
impl AnswerGenerator for ModelBacked {
    async fn generate(
        &self,
        question: &str,
        context: &ContextBlock,
        passages: &[ExtractedPassage],
    ) -> AppResult<Answer> {
        if passages.is_empty() || context.is_empty() {
            return Ok(Answer::no_results(question));
        }

        tracing::debug!(
            "Generating answer with {} (model: {}, context: {} chars)",
            self.client.provider_name(),
            self.model,
            context.char_len()
        );

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context.rendered().to_string());
        let prompt = build_prompt(&self.answer_prompt, vars)?;

        // Low temperature for factual answers
        let mut request = LlmRequest::new(prompt.user, &self.model)
            .with_temperature(0.3)
            .with_max_tokens(1000);
        if let Some(system) = prompt.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        let text = response.content.trim();
        if text.is_empty() {
            return Err(AppError::Llm("Model returned an empty answer".to_string()));
        }

        let sources = cited_sources(text, context);
        Ok(Answer::new(text, sources, AnswerMode::Model))
    }
}

/// Strategy that never calls a model.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFallback {
    snippet_count: usize,
}

impl TemplateFallback {
    pub fn new(snippet_count: usize) -> Self {
        Self { snippet_count }
    }

    /// Fixed-format answer listing the top sources and what they say.
    pub fn compose(&self, question: &str, passages: &[ExtractedPassage]) -> Answer {
        if passages.is_empty() {
            return Answer::no_results(question);
        }

        let mut text = format!(
            "No language model was available, so here is what the top web results say about \"{}\":\n",
            question
        );

        for (i, passage) in passages.iter().take(self.snippet_count).enumerate() {
            let snippet = collapse_whitespace(&passage.source.snippet);
            let excerpt = if snippet.is_empty() {
                truncate_chars(&passage.text, TEMPLATE_EXCERPT_CHARS)
            } else {
                snippet
            };

            text.push_str(&format!(
                "\n{}. {} ({})",
                i + 1,
                passage.source.title,
                passage.source.url
            ));
            if !excerpt.is_empty() {
                text.push_str(&format!("\n   {}", excerpt));
            }
        }

        let sources = passages.iter().map(|p| p.source.clone()).collect();
        Answer::new(text, sources, AnswerMode::Template)
    }
}

#[async_trait]
impl QueryRewriter for TemplateFallback {
    async fn rewrite(&self, question: &str) -> Vec<String> {
        vec![question.to_string()]
    }
}

#[async_trait]
impl AnswerGenerator for TemplateFallback {
    async fn generate(
        &self,
        question: &str,
        _context: &ContextBlock,
        passages: &[ExtractedPassage],
    ) -> AppResult<Answer> {
        Ok(self.compose(question, passages))
    }
}

/// The strategy chosen for a run.
pub enum AnswerStrategy {
    ModelBacked(ModelBacked),
    TemplateFallback(TemplateFallback),
}

impl AnswerStrategy {
    /// Select the strategy from configuration.
    ///
    /// Without a usable credential the lenient policy selects the template
    /// and the strict policy fails with a configuration error naming the
    /// credential variable.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        if !config.has_model_credentials() {
            return match config.credential_policy {
                CredentialPolicy::Strict => Err(AppError::Config(format!(
                    "No credential for provider '{}'. Please set your {} environment variable.",
                    config.provider, config.api_key_env
                ))),
                CredentialPolicy::Lenient => {
                    tracing::warn!(
                        "{} is not set; answering from search results without a model",
                        config.api_key_env
                    );
                    Ok(Self::TemplateFallback(TemplateFallback::new(
                        config.context.snippet_count,
                    )))
                }
            };
        }

        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
            Duration::from_secs(config.llm_timeout_secs),
        )?;

        let rewrite_prompt = load_prompt(&config.prompts_dir, REWRITE_PROMPT_ID)?;
        let answer_prompt = load_prompt(&config.prompts_dir, ANSWER_PROMPT_ID)?;

        tracing::debug!(
            "Using {} model {} for rewriting and answering",
            client.provider_name(),
            config.model
        );

        Ok(Self::ModelBacked(ModelBacked::new(
            client,
            config.model.clone(),
            rewrite_prompt,
            answer_prompt,
            config.search.max_queries,
        )))
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnswerStrategy::ModelBacked(_) => "model",
            AnswerStrategy::TemplateFallback(_) => "template",
        }
    }

    pub fn is_model_backed(&self) -> bool {
        matches!(self, AnswerStrategy::ModelBacked(_))
    }
}

#[async_trait]
impl QueryRewriter for AnswerStrategy {
    async fn rewrite(&self, question: &str) -> Vec<String> {
        match self {
            AnswerStrategy::ModelBacked(model) => model.rewrite(question).await,
            AnswerStrategy::TemplateFallback(template) => template.rewrite(question).await,
        }
    }
}

#[async_trait]
impl AnswerGenerator for AnswerStrategy {
    async fn generate(
        &self,
        question: &str,
        context: &ContextBlock,
        passages: &[ExtractedPassage],
    ) -> AppResult<Answer> {
        match self {
            AnswerStrategy::ModelBacked(model) => {
                model.generate(question, context, passages).await
            }
            AnswerStrategy::TemplateFallback(template) => {
                template.generate(question, context, passages).await
            }
        }
    }
}

/// Parse a rewrite response into at most `max_queries` queries.
///
/// One query per line. List markers and surrounding quotes are stripped,
/// empty lines and case-insensitive repeats dropped.
pub fn parse_query_lines(response: &str, max_queries: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut queries = Vec::new();

    for line in response.lines() {
        if queries.len() >= max_queries {
            break;
        }

        let line = line.trim();
        let line = LIST_MARKER.replace(line, "");
        let query = collapse_whitespace(line.trim().trim_matches(|c: char| matches!(c, '"' | '\'' | '`')));

        if query.is_empty() {
            continue;
        }
        if seen.insert(query.to_lowercase()) {
            queries.push(query);
        }
    }

    queries
}
