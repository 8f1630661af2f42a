/// Normalizes user-supplied text by stripping surrounding whitespace
/// and composing it into Unicode Normalization Form C.
///
/// ```
/// use moodtrack::normalization::normalize_text;
/// assert_eq!(normalize_text(" cafe\u{301} "), "caf\u{e9}");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.as_ref().trim().nfc().collect()
}

/// Returns at most the first `length` characters of `text`.
///
/// ```
/// use moodtrack::normalization::excerpt;
/// assert_eq!(excerpt("héllo wörld", 5), "héllo");
/// ```
pub fn excerpt(text: &str, length: usize) -> String {
    text.chars().take(length).collect()
}
