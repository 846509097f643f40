use crate::DOI_MARKER;
use crate::regex::Regex;
use std::sync::LazyLock;

static DOI_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://(?:dx\.)?doi\.org/(10\.\S+)$").unwrap());

static DOI_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^doi:?\s*(10\.\S+)$").unwrap());

static BARE_DOI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").unwrap());

/// Canonicalizes a raw identifier cell.
///
/// DOI URLs, `doi:`/`DOI ` prefixed values and bare `10.xxxx/...` strings become
/// a lowercase `doi:10.xxxx/...`. Anything else is trimmed and kept as is.
/// Blank input yields `None`.
pub(crate) fn canonical_identifier(raw: &str) -> Option<String> {
    let id = raw.trim();
    if id.is_empty() {
        return None;
    }

    let doi = DOI_URL_REGEX
        .captures(id)
        .or_else(|| DOI_PREFIX_REGEX.captures(id))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .or_else(|| BARE_DOI_REGEX.is_match(id).then_some(id));

    match doi {
        Some(doi) => Some(format!("{DOI_MARKER}{}", doi.to_lowercase())),
        None => Some(id.to_string()),
    }
}

/// Splits an author cell on `separator`, dropping blank names.
pub(crate) fn split_authors(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}
