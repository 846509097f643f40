//! Completeness scoring of records.
//!
//! The score ranks how detailed and trustworthy a record is. It is a heuristic,
//! not a probability: only the order of the scores within one duplicate group
//! matters.

use crate::{DOI_MARKER, Provenance, Record, is_present};
use serde::{Deserialize, Serialize};

/// Weights of the additive completeness rule.
///
/// The defaults are the canonical weighting:
///
/// | Term | Weight |
/// |---|---|
/// | non-empty title | +1.5 |
/// | date | +1 |
/// | publisher | +1 |
/// | link | +0.5 |
/// | authors | + min(count, 5) / 5 |
/// | group marking | +1.5 |
/// | image | +2 |
/// | DOI identifier | +1 |
/// | description | +1 |
/// | scholar-search provenance | -0.5 |
/// | manually curated provenance | +2 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub title: f64,
    pub date: f64,
    pub publisher: f64,
    pub link: f64,
    /// Weight of a full author list; partial lists earn a share of it.
    pub authors: f64,
    /// Author count at which the author term saturates.
    pub author_cap: usize,
    pub group: f64,
    pub image: f64,
    pub doi: f64,
    pub description: f64,
    pub scholar_search: f64,
    pub manual_sources: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title: 1.5,
            date: 1.0,
            publisher: 1.0,
            link: 0.5,
            authors: 1.0,
            author_cap: 5,
            group: 1.5,
            image: 2.0,
            doi: 1.0,
            description: 1.0,
            scholar_search: -0.5,
            manual_sources: 2.0,
        }
    }
}

impl ScoreWeights {
    /// Scores `record`. Identifiers starting with `doi_marker` earn the DOI term.
    pub fn score(&self, record: &Record, doi_marker: &str) -> f64 {
        let mut score = 0.0;

        if !record.title.is_empty() {
            score += self.title;
        }
        if is_present(&record.date) {
            score += self.date;
        }
        if is_present(&record.publisher) {
            score += self.publisher;
        }
        if is_present(&record.link) {
            score += self.link;
        }
        if !record.authors.is_empty() && self.author_cap > 0 {
            let counted = record.authors.len().min(self.author_cap);
            score += self.authors * counted as f64 / self.author_cap as f64;
        }
        if is_present(&record.group) {
            score += self.group;
        }
        if is_present(&record.image) {
            score += self.image;
        }
        if record.doi_identifier(doi_marker).is_some() {
            score += self.doi;
        }
        if is_present(&record.description) {
            score += self.description;
        }

        match record.provenance {
            Some(Provenance::ScholarSearch) => score += self.scholar_search,
            Some(Provenance::ManualSources) => score += self.manual_sources,
            _ => {}
        }

        score
    }
}

/// Scores `record` with the default weights and the `doi:` marker.
///
/// # Examples
///
/// ```
/// use citemerge::Record;
/// use citemerge::score::completeness_score;
///
/// let record = Record {
///     title: "Example".to_string(),
///     date: Some("2023-01-01".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(completeness_score(&record), 2.5);
/// ```
pub fn completeness_score(record: &Record) -> f64 {
    ScoreWeights::default().score(record, DOI_MARKER)
}
