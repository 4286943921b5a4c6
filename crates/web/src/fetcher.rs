//! Page fetching with parallel requests and timeouts.
//!
//! A failed fetch never aborts the run: the result keeps its place with no
//! page body and extraction falls back to the search snippet.

use async_trait::async_trait;
use futures::future::join_all;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::types::{FetchError, FetchedDocument, SearchResult};

/// Fetches the raw body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// `PageFetcher` backed by reqwest.
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    fn check_url(url: &str) -> Result<(), FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::UnsupportedUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }
        Ok(())
    }

    /// Only markup and plain text are worth extracting. A missing header is
    /// given the benefit of the doubt.
    fn is_textual(content_type: &str) -> bool {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        mime.is_empty() || mime.starts_with("text/") || mime == "application/xhtml+xml"
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Self::check_url(url)?;

        debug!("Fetching content from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16(), url.to_string()));
        }

        let headers = response.headers();
        if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            if !Self::is_textual(content_type) {
                return Err(FetchError::UnsupportedContent {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let declared_len = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared_len.is_some_and(|len| len > self.max_body_bytes) {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_body_bytes,
            });
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(url.to_string())
                } else {
                    FetchError::Http(e.to_string())
                }
            })?;
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from: {}", body.len(), url);
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Fetch every result concurrently.
///
/// Each fetch is bounded by `per_page_timeout`. The output has one document
/// per input result, in input order.
pub async fn fetch_all(
    fetcher: &dyn PageFetcher,
    results: Vec<SearchResult>,
    per_page_timeout: Duration,
) -> Vec<FetchedDocument> {
    let futures = results.iter().map(|result| async move {
        match tokio::time::timeout(per_page_timeout, fetcher.fetch(&result.url)).await {
            Ok(Ok(html)) => Some(html),
            Ok(Err(e)) => {
                warn!("Fetch failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Fetch failed: {}", FetchError::Timeout(result.url.clone()));
                None
            }
        }
    });

    let bodies = join_all(futures).await;

    results
        .into_iter()
        .zip(bodies)
        .map(|(source, raw_html)| FetchedDocument { source, raw_html })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fetcher(max_body_bytes: usize) -> HttpFetcher {
        HttpFetcher::new(Client::new(), max_body_bytes)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><body>Hello</body></html>")
            .create_async()
            .await;

        let body = fetcher(1024)
            .fetch(&format!("{}/page", server.url()))
            .await
            .unwrap();
        assert!(body.contains("Hello"));
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let result = fetcher(1024)
            .fetch(&format!("{}/missing", server.url()))
            .await;
        assert!(matches!(result, Err(FetchError::Status(404, _))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_binary_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/doc.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.7")
            .create_async()
            .await;

        let result = fetcher(1024)
            .fetch(&format!("{}/doc.pdf", server.url()))
            .await;
        assert!(matches!(result, Err(FetchError::UnsupportedContent { .. })));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/big")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("x".repeat(4096))
            .create_async()
            .await;

        let result = fetcher(1024).fetch(&format!("{}/big", server.url())).await;
        assert!(matches!(result, Err(FetchError::TooLarge { limit: 1024, .. })));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_scheme() {
        let result = fetcher(1024).fetch("file:///etc/passwd").await;
        assert!(matches!(result, Err(FetchError::UnsupportedUrl(_))));
    }

    #[test]
    fn test_is_textual() {
        assert!(HttpFetcher::is_textual("text/html; charset=utf-8"));
        assert!(HttpFetcher::is_textual("TEXT/PLAIN"));
        assert!(HttpFetcher::is_textual("application/xhtml+xml"));
        assert!(!HttpFetcher::is_textual("image/png"));
    }

    struct MapFetcher {
        pages: HashMap<String, String>,
        slow: Option<String>,
    }

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            if self.slow.as_deref() == Some(url) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status(404, url.to_string()))
        }
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order_and_absorbs_failures() {
        let mut pages = HashMap::new();
        pages.insert("https://a.com".to_string(), "A".to_string());
        pages.insert("https://c.com".to_string(), "C".to_string());
        pages.insert("https://slow.com".to_string(), "S".to_string());
        let fetcher = MapFetcher {
            pages,
            slow: Some("https://slow.com".to_string()),
        };

        let results = vec![
            SearchResult::new("A", "https://a.com", ""),
            SearchResult::new("B", "https://b.com", ""),
            SearchResult::new("Slow", "https://slow.com", ""),
            SearchResult::new("C", "https://c.com", ""),
        ];

        let docs = fetch_all(&fetcher, results, Duration::from_millis(200)).await;

        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0].raw_html.as_deref(), Some("A"));
        assert!(docs[1].raw_html.is_none());
        assert!(docs[2].raw_html.is_none());
        assert_eq!(docs[3].raw_html.as_deref(), Some("C"));
        assert_eq!(docs[3].source.title, "C");
    }
}
