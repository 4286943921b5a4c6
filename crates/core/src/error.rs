//! Error types for cli-search.
//!
//! This module defines a unified error enum covering every category that can
//! reach the top of a run: configuration, I/O, LLM, search, prompt and
//! serialization errors. Per-item failures (one page fetch, one parse) are
//! absorbed inside their component and never become an `AppError`.

use thiserror::Error;

/// Unified error type for cli-search.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credential, invalid config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Web search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error belongs to the configuration category.
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
