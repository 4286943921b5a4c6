//! DuckDuckGo search provider.
//!
//! Implements web search using DuckDuckGo's HTML interface.
//! No API key required.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::provider::SearchProvider;
use crate::text::collapse_whitespace;
use crate::types::{SearchError, SearchResult};

/// Default DuckDuckGo HTML endpoint.
pub const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo search provider (no API key required).
pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
    timeout_ms: u64,
}

impl DuckDuckGoProvider {
    /// Create a provider using an already configured HTTP client.
    ///
    /// `timeout_ms` is only used for error reporting; the client enforces it.
    pub fn new(client: Client, endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout_ms,
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    SearchError::Request {
                        message: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(SearchError::Status {
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| SearchError::Request {
            message: e.to_string(),
        })?;

        let results = parse_ddg_html(&html, num_results);
        if results.is_empty() {
            tracing::debug!("No results parsed from DuckDuckGo page ({} bytes)", html.len());
        }

        Ok(results)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Parse a DuckDuckGo HTML results page.
///
/// Tries the regular layout first, then the lite layout. Parsing is
/// best-effort: anything that does not look like an organic result is skipped.
pub fn parse_ddg_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    let results = parse_standard_layout(&document, max_results);
    if !results.is_empty() {
        return results;
    }

    parse_lite_layout(&document, max_results)
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// `<div class="result"> <a class="result__a" href=..>title</a> <a class="result__snippet">..</a>`
fn parse_standard_layout(document: &Html, max_results: usize) -> Vec<SearchResult> {
    let (Some(block_sel), Some(link_sel), Some(snippet_sel)) = (
        selector("div.result, div.web-result"),
        selector("a.result__a"),
        selector(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for block in document.select(&block_sel) {
        if results.len() >= max_results {
            break;
        }

        if block.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(link) = block.select(&link_sel).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(resolve_result_url) else {
            continue;
        };

        let title = element_text(link);
        if title.is_empty() {
            continue;
        }

        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        results.push(SearchResult::new(title, url, snippet));
    }

    results
}

/// Lite layout: `<a class="result-link">` rows followed by `<td class="result-snippet">` rows.
fn parse_lite_layout(document: &Html, max_results: usize) -> Vec<SearchResult> {
    let (Some(link_sel), Some(snippet_sel)) =
        (selector("a.result-link"), selector("td.result-snippet"))
    else {
        return Vec::new();
    };

    let mut snippets = document.select(&snippet_sel).map(element_text);

    let mut results = Vec::new();
    for link in document.select(&link_sel) {
        let snippet = snippets.next().unwrap_or_default();
        if results.len() >= max_results {
            break;
        }

        let Some(url) = link.value().attr("href").and_then(resolve_result_url) else {
            continue;
        };
        let title = element_text(link);
        if title.is_empty() {
            continue;
        }

        results.push(SearchResult::new(title, url, snippet));
    }

    results
}

/// Turn a result link into the absolute target URL.
///
/// DuckDuckGo wraps organic links as `//duckduckgo.com/l/?uddg=<encoded>`
/// and ads as `/y.js?...`. Ads and non-http(s) targets yield `None`.
fn resolve_result_url(href: &str) -> Option<String> {
    let href = href.trim();
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    let is_ddg = parsed
        .host_str()
        .map(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
        .unwrap_or(false);

    if is_ddg {
        if parsed.path().contains("y.js") {
            return None;
        }
        let target = parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())?;
        return is_web_url(&target).then_some(target);
    }

    is_web_url(&absolute).then_some(absolute)
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
