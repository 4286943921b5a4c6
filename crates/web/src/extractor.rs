//! HTML content extraction.
//!
//! Turns a fetched page into plain text using CSS selectors. Markup,
//! scripts, styles and page chrome are dropped.

use scraper::{ElementRef, Html, Selector};

use crate::text::{collapse_whitespace, truncate_chars};
use crate::types::{ExtractedPassage, FetchedDocument};

/// Containers that usually hold the main content, in priority order.
const MAIN_SELECTORS: [&str; 12] = [
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".story-body",
    ".article__body",
    ".content-body",
    "#article-body",
    "#content",
    ".prose",
];

/// A main-content candidate shorter than this is ignored in favor of the body.
const MIN_MAIN_CHARS: usize = 200;

/// Elements whose text never belongs in a passage.
const SKIPPED_TAGS: [&str; 13] = [
    "script", "style", "noscript", "template", "svg", "iframe", "nav", "header", "footer",
    "aside", "form", "button", "select",
];

/// Elements that separate words even when the markup has no whitespace.
const BLOCK_TAGS: [&str; 22] = [
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "td", "th", "tr",
    "table", "section", "article", "main", "blockquote", "pre", "dd",
];

/// Extract readable text from an HTML page.
///
/// Prefers a main-content container when one holds substantial text,
/// otherwise uses the whole body. The result is whitespace-normalized and
/// capped at `max_chars` characters. Malformed markup is parsed leniently;
/// the worst case is an empty string.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    for css in MAIN_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element_text(element);
            if text.chars().count() > MIN_MAIN_CHARS {
                return truncate_chars(&text, max_chars);
            }
        }
    }

    let mut body = document.root_element();
    if let Ok(selector) = Selector::parse("body") {
        if let Some(element) = document.select(&selector).next() {
            body = element;
        }
    }

    truncate_chars(&element_text(body), max_chars)
}

/// Build the passage for one fetched document.
///
/// When the page could not be fetched or yields no text, the search
/// snippet stands in for it.
pub fn extract_passage(document: FetchedDocument, max_chars: usize) -> ExtractedPassage {
    let text = document
        .raw_html
        .as_deref()
        .map(|html| extract_text(html, max_chars))
        .unwrap_or_default();

    if text.is_empty() {
        let snippet = truncate_chars(&collapse_whitespace(&document.source.snippet), max_chars);
        tracing::debug!("Using search snippet for {}", document.source.url);
        return ExtractedPassage::new(document.source, snippet);
    }

    ExtractedPassage::new(document.source, text)
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for node in element.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(node) {
            let tag = child.value().name();
            if SKIPPED_TAGS.contains(&tag) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&tag);
            if block {
                out.push(' ');
            }
            collect_text(child, out);
            if block {
                out.push(' ');
            }
        }
    }
}
