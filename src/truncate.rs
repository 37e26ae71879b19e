//! Sentence-boundary text truncation.

/// Shorten `text` to at most `max_chars` characters, preferring to cut right after a sentence.
///
/// Lengths are counted in `char`s so a cut never lands inside a code point. When the text
/// is too long, the result ends at the last `.` within the first `max_chars` characters,
/// provided that period is not the very first character. Otherwise the raw prefix is
/// returned as-is, with no ellipsis appended.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };

    let prefix = &text[..cut];
    match prefix.rfind('.') {
        // '.' is ASCII, so `pos + 1` is always a char boundary
        Some(pos) if pos > 0 => &prefix[..=pos],
        _ => prefix,
    }
}
