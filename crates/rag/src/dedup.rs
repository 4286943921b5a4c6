//! Passage deduplication by normalized URL and normalized text.

use clisearch_web::{collapse_whitespace, ExtractedPassage};
use std::collections::HashSet;
use url::Url;

/// Query parameters that only track the visitor.
const TRACKING_PARAMS: [&str; 8] = [
    "gclid", "fbclid", "msclkid", "mc_cid", "mc_eid", "ref", "ref_src", "yclid",
];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Canonical form of a URL used for duplicate detection.
///
/// Lowercases the host, drops the scheme, default port, fragment, tracking
/// parameters and trailing slashes: `host[:port]path[?query]`.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();

    let Ok(url) = Url::parse(trimmed) else {
        return fallback_normalize(trimmed);
    };
    let Some(host) = url.host_str() else {
        return fallback_normalize(trimmed);
    };

    let mut normalized = host.to_ascii_lowercase();

    // `port()` is None for the scheme's default port
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    normalized.push_str(url.path().trim_end_matches('/'));

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if !kept.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish();
        normalized.push('?');
        normalized.push_str(&query);
    }

    normalized
}

fn fallback_normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    without_scheme.trim_end_matches('/').to_string()
}

/// Remove repeated passages, keeping the first occurrence.
///
/// A passage is a repeat when its normalized URL was already seen, or, with
/// `dedupe_text`, when its non-empty whitespace-normalized text matches an
/// earlier passage exactly.
pub fn deduplicate(passages: Vec<ExtractedPassage>, dedupe_text: bool) -> Vec<ExtractedPassage> {
    let mut seen_urls = HashSet::new();
    let mut seen_texts = HashSet::new();

    passages
        .into_iter()
        .filter(|passage| {
            if !seen_urls.insert(normalize_url(&passage.source.url)) {
                tracing::debug!("Dropping duplicate URL: {}", passage.source.url);
                return false;
            }

            if dedupe_text {
                let text = collapse_whitespace(&passage.text);
                if !text.is_empty() && !seen_texts.insert(text) {
                    tracing::debug!("Dropping duplicate text from: {}", passage.source.url);
                    return false;
                }
            }

            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clisearch_web::SearchResult;

    fn passage(url: &str, text: &str) -> ExtractedPassage {
        ExtractedPassage::new(SearchResult::new("Title", url, "snippet"), text)
    }

    #[test]
    fn test_normalize_strips_tracking_and_scheme() {
        assert_eq!(normalize_url("http://a.com/x?utm=1"), "a.com/x");
        assert_eq!(normalize_url("http://a.com/x"), "a.com/x");
        assert_eq!(
            normalize_url("https://a.com/x?utm_source=news&id=7&fbclid=abc"),
            "a.com/x?id=7"
        );
    }

    #[test]
    fn test_normalize_host_port_fragment_and_slash() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM:443/Path/#section"),
            "example.com/Path"
        );
        assert_eq!(normalize_url("http://example.com:8080/"), "example.com:8080");
        assert_eq!(normalize_url("https://example.com"), "example.com");
    }

    #[test]
    fn test_normalize_unparseable_url() {
        assert_eq!(normalize_url("  HTTP://Not A Url/ "), "not a url");
        assert_eq!(normalize_url("relative/path/"), "relative/path");
    }

    #[test]
    fn test_dedup_by_url_keeps_first_text() {
        let passages = vec![
            passage("http://a.com/x?utm=1", "first"),
            passage("https://b.com", "other"),
            passage("http://a.com/x", "second"),
        ];

        let kept = deduplicate(passages, true);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "first");
        assert_eq!(kept[1].source.url, "https://b.com");
    }

    #[test]
    fn test_dedup_by_normalized_text() {
        let passages = vec![
            passage("https://a.com", "Same   text\nhere"),
            passage("https://b.com", "Same text here"),
            passage("https://c.com", "Different"),
        ];

        assert_eq!(deduplicate(passages.clone(), true).len(), 2);
        assert_eq!(deduplicate(passages, false).len(), 3);
    }

    #[test]
    fn test_dedup_keeps_distinct_empty_passages() {
        let passages = vec![passage("https://a.com", ""), passage("https://b.com", "")];
        assert_eq!(deduplicate(passages, true).len(), 2);
    }

    #[test]
    fn test_dedup_each_normalized_url_once() {
        let urls = [
            "https://a.com/",
            "http://A.com",
            "https://a.com/#top",
            "https://a.com/?gclid=1",
            "https://b.com/page",
            "https://b.com/page/",
        ];
        let passages: Vec<_> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| passage(url, &format!("text {}", i)))
            .collect();

        let kept = deduplicate(passages, true);
        let normalized: Vec<_> = kept.iter().map(|p| normalize_url(&p.source.url)).collect();

        assert_eq!(normalized, vec!["a.com", "b.com/page"]);
        assert_eq!(kept[0].text, "text 0");
        assert_eq!(kept[1].text, "text 4");
    }
}
