//! String utilities for the domain layer.

/// Truncate a string to at most `max_chars` characters, ending in `...`
///
/// Counts characters rather than bytes, so multi-byte text keeps the
/// same visible length as ASCII. Strings within the limit are returned
/// unchanged.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let head: String = s.chars().take(keep).collect();
    format!("{}...", head)
}

/// Borrow at most the first `max_chars` characters of a string
///
/// Never splits a UTF-8 character.
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Strip any run of leading and trailing single or double quotes
pub fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}
