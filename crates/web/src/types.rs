//! Core types for web search, page fetching and extraction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single search result from a web search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the search result
    pub title: String,
    /// Absolute URL of the search result
    pub url: String,
    /// Snippet/description shown by the search engine
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Raw page content for one search result.
///
/// `raw_html` is `None` when the fetch failed for any reason.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source: SearchResult,
    pub raw_html: Option<String>,
}

impl FetchedDocument {
    pub fn fetched(&self) -> bool {
        self.raw_html.is_some()
    }
}

/// Plain text extracted for one search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedPassage {
    pub source: SearchResult,
    /// Whitespace-normalized text without markup
    pub text: String,
    /// Length of `text` in characters
    pub length: usize,
}

impl ExtractedPassage {
    pub fn new(source: SearchResult, text: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self {
            source,
            text,
            length,
        }
    }
}

/// Errors that can occur during a search request.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Request could not be sent or the body could not be read
    #[error("Search request failed: {message}")]
    Request {
        /// Underlying error message
        message: String,
    },

    /// Non-success HTTP status
    #[error("Search API error: HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Search request timed out
    #[error("Search timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Timeout fetching: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {0} for: {1}")]
    Status(u16, String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("Unsupported content type '{content_type}' for: {url}")]
    UnsupportedContent { url: String, content_type: String },

    #[error("Body larger than {limit} bytes for: {url}")]
    TooLarge { url: String, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_length_counts_chars() {
        let source = SearchResult::new("Café", "https://example.com", "");
        let passage = ExtractedPassage::new(source, "Crème brûlée");
        assert_eq!(passage.length, 12);
        assert!(passage.text.len() > passage.length);
    }

    #[test]
    fn test_search_result_serialization() {
        let result = SearchResult::new("Title", "https://example.com", "Snippet");
        let json = serde_json::to_string(&result).unwrap();
        let back: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_error_display() {
        let error = SearchError::Status { status: 503 };
        assert!(error.to_string().contains("503"));

        let error = FetchError::TooLarge {
            url: "https://example.com".to_string(),
            limit: 1024,
        };
        assert!(error.to_string().contains("1024"));
    }

    #[test]
    fn test_fetched_document_state() {
        let doc = FetchedDocument {
            source: SearchResult::new("t", "https://example.com", "s"),
            raw_html: None,
        };
        assert!(!doc.fetched());
    }
}
