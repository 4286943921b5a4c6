//! HTTP client construction for search and page fetching.

use clisearch_core::config::{FetchSettings, SearchSettings};
use clisearch_core::{AppError, AppResult};
use reqwest::{redirect, Client};
use std::time::Duration;

/// Browser-like user agent; some sites refuse obvious bots.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build the client used for the search engine request.
pub fn build_search_client(settings: &SearchSettings) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create search HTTP client: {}", e)))
}

/// Build the client used for page fetches.
///
/// Follows at most `max_redirects` redirects and skips certificate
/// validation when `accept_invalid_certs` is set.
pub fn build_fetch_client(settings: &FetchSettings) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::limited(settings.max_redirects))
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create fetch HTTP client: {}", e)))
}
