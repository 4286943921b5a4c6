//! Plain-text helpers shared by extraction, deduplication and assembly.
//!
//! All lengths are measured in characters, never bytes, so truncation is
//! always on a char boundary.

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate `text` to at most `max_chars` characters.
///
/// When the cut lands inside a word, the partial word is dropped as long as
/// an earlier word boundary exists. Trailing whitespace is trimmed.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut boundary = None;
    for (count, (byte_idx, ch)) in text.char_indices().enumerate() {
        if count == max_chars {
            boundary = Some((byte_idx, ch));
            break;
        }
    }

    let Some((cut, next_char)) = boundary else {
        return text.to_string();
    };

    let head = &text[..cut];
    if !next_char.is_whitespace() {
        if let Some(last_space) = head.rfind(char::is_whitespace) {
            return head[..last_space].trim_end().to_string();
        }
    }

    head.trim_end().to_string()
}
