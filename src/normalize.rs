//! Canonical forms of titles and author names used for comparison.

/// Normalizes a title for comparison.
///
/// The title is lowercased and every character that is neither alphanumeric nor
/// whitespace is dropped. Whitespace is kept as-is, so word boundaries survive.
///
/// # Examples
///
/// ```
/// use citemerge::normalize::normalize_title;
///
/// assert_eq!(normalize_title("Deep learning for X."), "deep learning for x");
/// assert_eq!(normalize_title(""), "");
/// ```
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Normalizes an author name: lowercased, surrounding whitespace trimmed.
pub fn normalize_author(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}
