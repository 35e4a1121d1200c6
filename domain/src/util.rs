//! Shared utility functions.

/// Take at most `max_chars` Unicode scalar values from `s`.
///
/// Returns the prefix and whether anything was cut off. Counting is by
/// `char`, so CJK text is measured the same way users perceive it.
pub fn truncate_chars(s: &str, max_chars: usize) -> (&str, bool) {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => (&s[..end], true),
        None => (s, false),
    }
}

/// Short single-line preview of a message for log output.
pub fn preview(s: &str, max_chars: usize) -> String {
    let (head, truncated) = truncate_chars(s, max_chars);
    let head = head.replace('\n', " ");
    if truncated { format!("{head}…") } else { head }
}
