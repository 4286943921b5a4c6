//! LLM integration crate for cli-search.
//!
//! This crate provides a provider-agnostic abstraction for the two model calls
//! a run can make: query rewriting and answer synthesis.
//!
//! # Providers
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint (default)
//! - **Ollama**: local LLM runtime, no credential needed
//!
//! # Example
//! ```no_run
//! use clisearch_llm::{create_client, LlmRequest};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("openai", None, Some("sk-..."), Duration::from_secs(60))?;
//! let request = LlmRequest::new("Hello, world!", "gpt-4o");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
