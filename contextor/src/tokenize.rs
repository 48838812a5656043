//! Keyword extraction shared by query and chunk scoring.

use std::collections::HashSet;

/// Word characters: Unicode letters and digits plus `_`.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Distinct runs of word characters in the lower-cased `text`.
///
/// Lower-casing happens before splitting, so characters it introduces
/// (such as the combining dot in `"İ".to_lowercase()`) split tokens too.
/// Punctuation splits tokens, so `"Peru's"` yields `{"peru", "s"}`.
///
/// ```
/// use contextor::tokenize::keyword_set;
/// let k = keyword_set("Peru's Youth");
/// assert!(k.contains("peru") && k.contains("youth") && k.contains("s"));
/// ```
pub fn keyword_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
