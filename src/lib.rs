//! A library for merging bibliographic records into a single canonical bibliography.
//!
//! `citemerge` takes records gathered from heterogeneous sources (manually curated
//! references, citation-metadata lookups, scholarly search results) and collapses the
//! ones that describe the same work, keeping the most complete record of each group
//! and an audit trail explaining every merge.
//!
//! # Key Features
//!
//! - **Tiered duplicate detection**:
//!   - Exact DOI identifier matching
//!   - Titles identical after normalization
//!   - Highly similar titles gated by a first-author match
//!
//! - **Explainable merging**:
//!   - Completeness scoring of every record
//!   - Per-group audit of the kept and removed records with their scores
//!   - Similarity log of every compared title pair
//!
//! - **Collaborators**:
//!   - CSV ingestion with configurable header mappings
//!   - Text summary and CSV exports of the audit trail
//!
//! # Basic Usage
//!
//! ```rust
//! use citemerge::Record;
//! use citemerge::dedupe::Deduplicator;
//!
//! let records = vec![
//!     Record {
//!         title: "Deep Learning for X".to_string(),
//!         ..Default::default()
//!     },
//!     Record {
//!         title: "Deep learning for X.".to_string(),
//!         publisher: Some("Nature".to_string()),
//!         ..Default::default()
//!     },
//! ];
//!
//! let outcome = Deduplicator::new().deduplicate(&records);
//! assert_eq!(outcome.records.len(), 1);
//! assert_eq!(outcome.audits[0].kept.index, 1);
//! ```
//!
//! # CSV Ingestion
//!
//! ```rust
//! use citemerge::{RecordParser, csv::CsvParser};
//!
//! let input = "id,title,authors\ndoi:10.1/x,Example Paper,Jane Smith";
//! let records = CsvParser::new().parse(input).unwrap();
//! assert_eq!(records[0].identifier.as_deref(), Some("doi:10.1/x"));
//! ```
//!
//! # Error Handling
//!
//! The dedup core is a total function and never fails. Ingestion and report export
//! use the crate [`Result`] type wrapping [`RecordError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "csv")]
extern crate csv as csv_crate;

#[cfg(feature = "csv")]
pub mod csv;
pub mod dedupe;
pub mod normalize;
mod regex;
pub mod report;
pub mod score;
pub mod similarity;
mod utils;

// Reexports
#[cfg(feature = "csv")]
pub use csv::CsvParser;
pub use dedupe::{DedupeOutcome, Deduplicator, DeduplicatorConfig};

/// Identifier prefix marking the DOI namespace.
pub const DOI_MARKER: &str = "doi:";

/// A specialized Result type for ingestion and reporting operations.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors raised by the collaborators around the dedup core.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed input: {message} at line {line}")]
    MalformedInput { message: String, line: usize },

    #[error("Error: {0}")]
    Other(String),
}

#[cfg(feature = "csv")]
impl From<csv_crate::Error> for RecordError {
    fn from(err: csv_crate::Error) -> Self {
        RecordError::InvalidFormat(err.to_string())
    }
}

/// The ingestion collaborator that produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// References entered by hand into the curated sources list.
    ManualSources,
    /// Results returned by the scholarly search API.
    ScholarSearch,
    /// Any other plugin, kept by name.
    Other(String),
}

impl Provenance {
    /// Name of the plugin this provenance stands for.
    pub fn as_str(&self) -> &str {
        match self {
            Provenance::ManualSources => "sources",
            Provenance::ScholarSearch => "google-scholar",
            Provenance::Other(name) => name,
        }
    }
}

impl From<&str> for Provenance {
    /// Maps an ingestion plugin name (with or without its `.py` suffix).
    fn from(plugin: &str) -> Self {
        let plugin = plugin.trim();
        let stem = plugin.strip_suffix(".py").unwrap_or(plugin);
        if stem.contains("google-scholar") {
            Provenance::ScholarSearch
        } else if stem == "sources" {
            Provenance::ManualSources
        } else {
            Provenance::Other(plugin.to_string())
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bibliographic record.
///
/// Optional fields that are `None` or hold an empty string are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Stable handle assigned when the batch is built. Never used for matching.
    pub key: String,
    /// Free-form identifier, possibly carrying a namespace prefix such as `doi:`
    pub identifier: Option<String>,
    /// Title of the work
    pub title: String,
    /// Ordered list of author names
    pub authors: Vec<String>,
    /// Publisher or venue
    pub publisher: Option<String>,
    /// Publication date in sortable textual form
    pub date: Option<String>,
    /// Link to the work
    pub link: Option<String>,
    /// Group or special marking
    pub group: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Image reference
    pub image: Option<String>,
    /// Which collaborator produced the record
    pub provenance: Option<Provenance>,
}

impl Record {
    /// The first author's name, if any.
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Returns the identifier when it begins with `marker`.
    pub fn doi_identifier(&self, marker: &str) -> Option<&str> {
        self.identifier
            .as_deref()
            .filter(|id| !marker.is_empty() && id.starts_with(marker))
    }
}

/// Returns true when an optional field holds a non-empty value.
pub(crate) fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

/// Trait for ingestion collaborators that turn raw input into records.
pub trait RecordParser {
    /// Parse a string containing one or more records.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the input is malformed
    fn parse(&self, input: &str) -> Result<Vec<Record>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn test_record_error_display() {
        let error = RecordError::InvalidFormat("Invalid line".to_string());
        assert_eq!(error.to_string(), "Parse error: Invalid line");

        let error = RecordError::MalformedInput {
            message: "unterminated quote".to_string(),
            line: 3,
        };
        assert_eq!(
            error.to_string(),
            "Malformed input: unterminated quote at line 3"
        );
    }

    #[rstest]
    #[case("sources.py", Provenance::ManualSources)]
    #[case("sources", Provenance::ManualSources)]
    #[case("google-scholar.py", Provenance::ScholarSearch)]
    #[case(" google-scholar ", Provenance::ScholarSearch)]
    #[case("orcid.py", Provenance::Other("orcid.py".to_string()))]
    #[case("metasources.py", Provenance::Other("metasources.py".to_string()))]
    fn test_provenance_from_plugin(#[case] plugin: &str, #[case] expected: Provenance) {
        assert_eq!(Provenance::from(plugin), expected);
    }

    #[test]
    fn test_doi_identifier() {
        let record = Record {
            identifier: Some("doi:10.1/x".to_string()),
            ..Default::default()
        };
        assert_eq!(record.doi_identifier("doi:"), Some("doi:10.1/x"));
        assert_eq!(record.doi_identifier("pmid:"), None);
        assert_eq!(record.doi_identifier(""), None);
        assert_eq!(Record::default().doi_identifier("doi:"), None);
    }

    #[test]
    fn test_is_present() {
        assert!(is_present(&Some("x".to_string())));
        assert!(!is_present(&Some(String::new())));
        assert!(!is_present(&None));
    }
}
