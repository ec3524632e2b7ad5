//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Like [`truncate_str`], but appends `...` when anything was cut off.
pub fn truncate_with_ellipsis(s: &str, max_bytes: usize) -> String {
    let head = truncate_str(s, max_bytes);
    if head.len() < s.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}
