//! LLM provider factory.
//!
//! Builds an LLM client from the configured provider name, endpoint and
//! credential.

use crate::client::LlmClient;
use crate::providers::ollama::DEFAULT_OLLAMA_ENDPOINT;
use crate::providers::openai::DEFAULT_OPENAI_ENDPOINT;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use clisearch_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required by providers that authenticate)
/// * `timeout` - Per-request timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown, a required key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(DEFAULT_OPENAI_ENDPOINT);
            Ok(Arc::new(OpenAiClient::with_base_url(base_url, api_key, timeout)?))
        }
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            Ok(Arc::new(OllamaClient::with_base_url(base_url, timeout)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_openai_client_with_key() {
        let client =
            create_client("openai", Some("http://localhost:8080/v1"), Some("sk-test"), TIMEOUT)
                .unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None, TIMEOUT) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires API key")),
            _ => panic!("Expected config error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, TIMEOUT) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown provider")),
            _ => panic!("Expected error for unknown provider"),
        }
    }
}
