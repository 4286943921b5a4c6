//! Configuration management for cli-search.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - A YAML config file (`.clisearch/config.yaml` or an explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. Nothing here performs network I/O.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".clisearch/config.yaml";

/// Default environment variable holding the LLM credential.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Providers the factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// What to do when the LLM credential is missing or the model call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialPolicy {
    /// Fall back to the template answer.
    #[default]
    Lenient,
    /// Fail the run with a configuration error.
    Strict,
}

/// Web search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// HTML search endpoint (DuckDuckGo HTML interface by default)
    pub endpoint: String,

    /// Maximum number of results fetched per run
    pub max_results: usize,

    /// Maximum number of rewritten queries
    pub max_queries: usize,

    /// Timeout for the search request, in seconds
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_results: 5,
            max_queries: 3,
            timeout_secs: 10,
        }
    }
}

/// Page fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub max_body_bytes: usize,

    /// Skip TLS certificate validation to maximize reachability
    pub accept_invalid_certs: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_redirects: 5,
            max_body_bytes: 2 * 1024 * 1024,
            accept_invalid_certs: true,
        }
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextSettings {
    /// Character cap for the text extracted from a single page
    pub per_source_chars: usize,

    /// Character budget for the whole context block
    pub budget_chars: usize,

    /// Number of sources listed in a template answer
    pub snippet_count: usize,

    /// Also drop passages whose normalized text repeats an earlier one
    pub dedupe_text: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            per_source_chars: 2000,
            budget_chars: 6000,
            snippet_count: 3,
            dedupe_text: true,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// LLM provider ("openai" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom LLM endpoint (provider default when absent)
    pub endpoint: Option<String>,

    /// Environment variable holding the LLM credential
    pub api_key_env: String,

    /// Credential resolved from `api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Timeout for LLM calls, in seconds
    pub llm_timeout_secs: u64,

    pub search: SearchSettings,
    pub fetch: FetchSettings,
    pub context: ContextSettings,

    /// Behavior when no model is usable
    pub credential_policy: CredentialPolicy,

    /// Directory with prompt overrides
    pub prompts_dir: PathBuf,

    /// Log filter override
    pub log_level: Option<String>,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    llm: Option<LlmSection>,
    search: Option<SearchSettings>,
    fetch: Option<FetchSettings>,
    context: Option<ContextSettings>,
    answer: Option<AnswerSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerSection {
    credential_policy: Option<CredentialPolicy>,
    prompts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            llm_timeout_secs: 60,
            search: SearchSettings::default(),
            fetch: FetchSettings::default(),
            context: ContextSettings::default(),
            credential_policy: CredentialPolicy::default(),
            prompts_dir: PathBuf::from(".clisearch/prompts"),
            log_level: None,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment and the default config file.
    ///
    /// Environment variables:
    /// - `CLISEARCH_CONFIG`: Path to config file
    /// - `CLISEARCH_PROVIDER`: LLM provider
    /// - `CLISEARCH_MODEL`: Model identifier
    /// - `CLISEARCH_ENDPOINT`: LLM endpoint
    /// - `OPENAI_API_KEY` (or `llm.apiKeyEnv`): LLM credential
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use clisearch_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Provider: {}", config.provider);
    /// ```
    pub fn load() -> AppResult<Self> {
        let config_file = std::env::var("CLISEARCH_CONFIG").ok().map(PathBuf::from);
        Self::load_from(config_file.as_deref())
    }

    /// Load configuration, merging an explicit config file when given.
    ///
    /// An explicit path must exist. Without one, `.clisearch/config.yaml` is
    /// merged only if present.
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(path)?;
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    config = config.merge_yaml(&default_path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("CLISEARCH_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CLISEARCH_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("CLISEARCH_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
            config.no_color = true;
        }

        config.api_key = config.resolve_api_key();

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut merged = self.merge_yaml_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        merged.config_file = Some(path.to_path_buf());

        tracing::debug!("Merged config file {:?}", path);
        Ok(merged)
    }

    /// Merge YAML text into a copy of this config.
    pub fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(api_key_env) = llm.api_key_env {
                result.api_key_env = api_key_env;
            }
            if let Some(timeout) = llm.timeout_secs {
                result.llm_timeout_secs = timeout;
            }
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(fetch) = config_file.fetch {
            result.fetch = fetch;
        }

        if let Some(context) = config_file.context {
            result.context = context;
        }

        if let Some(answer) = config_file.answer {
            if let Some(policy) = answer.credential_policy {
                result.credential_policy = policy;
            }
            if let Some(dir) = answer.prompts_dir {
                result.prompts_dir = dir;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the
    /// config file. `strict` can only tighten the credential policy. The log
    /// level is resolved separately by [`crate::logging::resolve_filter`].
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        max_results: Option<usize>,
        strict: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(max_results) = max_results {
            self.search.max_results = max_results;
        }

        if strict {
            self.credential_policy = CredentialPolicy::Strict;
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Read the credential from the configured environment variable.
    ///
    /// Blank values count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Whether the active provider needs a credential to be usable.
    pub fn provider_requires_key(&self) -> bool {
        !self.provider.eq_ignore_ascii_case("ollama")
    }

    /// Whether a language model can be used for this run.
    pub fn has_model_credentials(&self) -> bool {
        !self.provider_requires_key() || self.api_key.is_some()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model cannot be empty".to_string()));
        }

        if self.search.max_results == 0 {
            return Err(AppError::Config(
                "search.maxResults must be at least 1".to_string(),
            ));
        }

        if self.search.max_queries == 0 {
            return Err(AppError::Config(
                "search.maxQueries must be at least 1".to_string(),
            ));
        }

        if self.context.budget_chars == 0 || self.context.per_source_chars == 0 {
            return Err(AppError::Config(
                "context.budgetChars and context.perSourceChars must be positive".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0 || self.search.timeout_secs == 0 {
            return Err(AppError::Config("Timeouts must be positive".to_string()));
        }

        Ok(())
    }
}
