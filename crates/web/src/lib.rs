//! Web search, page fetching and text extraction for cli-search.
//!
//! - [`SearchClient`] runs queries against a [`SearchProvider`] and never fails
//! - [`fetch_all`] downloads result pages concurrently through a [`PageFetcher`]
//! - [`extract_passage`] turns a fetched page into plain text

pub mod duckduckgo;
pub mod extractor;
pub mod fetcher;
pub mod http;
pub mod provider;
pub mod text;
pub mod types;

pub use duckduckgo::{parse_ddg_html, DuckDuckGoProvider, DDG_HTML_URL};
pub use extractor::{extract_passage, extract_text};
pub use fetcher::{fetch_all, HttpFetcher, PageFetcher};
pub use http::{build_fetch_client, build_search_client};
pub use provider::{SearchClient, SearchProvider};
pub use text::{collapse_whitespace, truncate_chars};
pub use types::{ExtractedPassage, FetchError, FetchedDocument, SearchError, SearchResult};
