//! Human and machine readable reports of a deduplication run.
//!
//! [`text_summary`] renders the plain text review of every merge decision. With the
//! `csv` feature, [`write_similarity_csv`] and [`write_audit_csv`] export the
//! similarity log and the audit trail to any writer.
//!
//! # Example
//!
//! ```
//! use citemerge::{Deduplicator, Record};
//! use citemerge::report::text_summary;
//!
//! let records = vec![
//!     Record { title: "Deep Learning".to_string(), ..Default::default() },
//!     Record { title: "Deep learning.".to_string(), ..Default::default() },
//! ];
//! let outcome = Deduplicator::new().deduplicate(&records);
//!
//! let summary = text_summary(&records, &outcome);
//! assert!(summary.contains("Duplicate groups found: 1"));
//! ```

use crate::dedupe::{AuditEntry, DedupeOutcome};
use crate::{Provenance, Record};
use itertools::Itertools;
use std::fmt;

/// Identifier prefixes handed out by the scholarly search source.
const SCHOLAR_ID_PREFIXES: &[&str] = &["gs-id:", "pyOTFWoAAAAJ:"];

const RULE_WIDTH: usize = 30;

/// Formats an author list for display.
///
/// # Examples
///
/// ```
/// use citemerge::report::format_authors;
///
/// let authors = vec!["Jane Smith".to_string(), "Bob Jones".to_string()];
/// assert_eq!(format_authors(&authors), "Jane Smith and Bob Jones");
/// assert_eq!(format_authors(&[]), "Unknown authors");
/// ```
pub fn format_authors(authors: &[String]) -> String {
    match authors {
        [] => "Unknown authors".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [first, ..] => format!("{first} et al."),
    }
}

/// Whether the record came from scholarly search alone.
///
/// A record counts when its provenance or identifier points at the search source
/// and no other record in `records` carries the same identifier from another
/// source.
fn is_scholar_only(records: &[Record], index: usize) -> bool {
    let record = &records[index];
    let scholar_id = record
        .identifier
        .as_deref()
        .is_some_and(|id| SCHOLAR_ID_PREFIXES.iter().any(|p| id.starts_with(p)));
    let scholar_provenance = record.provenance == Some(Provenance::ScholarSearch);
    if !scholar_id && !scholar_provenance {
        return false;
    }

    let Some(identifier) = record.identifier.as_deref() else {
        return true;
    };
    !records.iter().enumerate().any(|(other_index, other)| {
        other_index != index
            && other.identifier.as_deref() == Some(identifier)
            && other.provenance != Some(Provenance::ScholarSearch)
    })
}

/// Indices of the records that only the scholarly search source produced.
pub fn scholar_only_indices(records: &[Record]) -> Vec<usize> {
    (0..records.len())
        .filter(|&index| is_scholar_only(records, index))
        .collect_vec()
}

/// Renders the plain text summary of a run over `records`.
pub fn text_summary(records: &[Record], outcome: &DedupeOutcome) -> String {
    Summary { records, outcome }.to_string()
}

struct Summary<'a> {
    records: &'a [Record],
    outcome: &'a DedupeOutcome,
}

/// Display adapter for the fields shown for every listed record.
struct Described<'a> {
    record: &'a Record,
    indent: &'a str,
}

impl fmt::Display for Described<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        writeln!(f, "{}by {}", self.indent, format_authors(&record.authors))?;
        writeln!(
            f,
            "{}in {} ({})",
            self.indent,
            or_default(&record.publisher, "Unknown source"),
            or_default(&record.date, "Unknown date")
        )
    }
}

fn or_default<'a>(field: &'a Option<String>, fallback: &'a str) -> &'a str {
    field.as_deref().filter(|s| !s.is_empty()).unwrap_or(fallback)
}

fn title_or_default(record: &Record) -> &str {
    if record.title.is_empty() {
        "No title"
    } else {
        &record.title
    }
}

fn id_or_default(record: &Record) -> &str {
    or_default(&record.identifier, "No ID")
}

fn write_entry(
    f: &mut fmt::Formatter<'_>,
    entry: &AuditEntry,
    first_indent: &str,
    indent: &str,
) -> fmt::Result {
    writeln!(f, "{first_indent}\"{}\"", title_or_default(&entry.record))?;
    write!(
        f,
        "{}",
        Described {
            record: &entry.record,
            indent,
        }
    )?;
    writeln!(f, "{indent}Score: {:.2}", entry.score)?;
    writeln!(f, "{indent}ID: {}", id_or_default(&entry.record))?;
    writeln!(f)
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        let scholar_only = scholar_only_indices(self.records);

        writeln!(f, "CITATION DEDUPLICATION SUMMARY")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f)?;
        writeln!(f, "Total citations: {}", self.records.len())?;
        writeln!(f, "Duplicate groups found: {}", self.outcome.groups.len())?;
        writeln!(f, "Citations removed: {}", self.outcome.removed_count())?;
        writeln!(f, "Final citation count: {}", self.outcome.records.len())?;
        writeln!(f, "Google Scholar only entries: {}", scholar_only.len())?;
        writeln!(f)?;

        if self.outcome.audits.is_empty() {
            writeln!(f, "No duplicates were found and removed.")?;
            return Ok(());
        }

        writeln!(f, "DETAILS OF DUPLICATE GROUPS")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;

        for audit in &self.outcome.audits {
            writeln!(f, "GROUP {}:", audit.group_id)?;
            write_entry(f, &audit.kept, "  KEPT: ", "        ")?;

            if !audit.removed.is_empty() {
                writeln!(f, "  REMOVED:")?;
                for removed in &audit.removed {
                    write_entry(f, removed, "    - ", "      ")?;
                }
            }

            writeln!(f, "{rule}")?;
            writeln!(f)?;
        }

        if !scholar_only.is_empty() {
            writeln!(f, "GOOGLE SCHOLAR ONLY ENTRIES")?;
            writeln!(f, "{rule}")?;
            writeln!(f)?;
            writeln!(
                f,
                "Found {} entries that exist only in Google Scholar:",
                scholar_only.len()
            )?;
            writeln!(f)?;

            for (position, &index) in scholar_only.iter().enumerate() {
                let record = &self.records[index];
                writeln!(f, "{}. \"{}\"", position + 1, title_or_default(record))?;
                write!(
                    f,
                    "{}",
                    Described {
                        record,
                        indent: "   ",
                    }
                )?;
                writeln!(f, "   ID: {}", id_or_default(record))?;
                writeln!(f)?;
            }

            writeln!(f, "{rule}")?;
            writeln!(f)?;
            writeln!(
                f,
                "NOTE: These entries might need to be properly cataloged in your sources."
            )?;
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(feature = "csv")]
pub use self::export::{write_audit_csv, write_similarity_csv};

#[cfg(feature = "csv")]
mod export {
    use crate::Result;
    use crate::dedupe::{AuditEntry, MergeAudit, SimilarityEntry};
    use csv_crate::Writer;
    use serde::Serialize;
    use std::io;

    #[derive(Serialize)]
    struct AuditRow<'a> {
        group_id: usize,
        action: &'static str,
        index: usize,
        score: f64,
        reason: &'static str,
        key: &'a str,
        identifier: &'a str,
        title: &'a str,
        authors: String,
    }

    impl<'a> AuditRow<'a> {
        fn new(group_id: usize, action: &'static str, entry: &'a AuditEntry) -> Self {
            Self {
                group_id,
                action,
                index: entry.index,
                score: entry.score,
                reason: entry.reason.kind(),
                key: &entry.record.key,
                identifier: entry.record.identifier.as_deref().unwrap_or_default(),
                title: &entry.record.title,
                authors: entry.record.authors.join("; "),
            }
        }
    }

    /// Writes the similarity log as CSV, one row per compared title pair.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_similarity_csv<W: io::Write>(writer: W, log: &[SimilarityEntry]) -> Result<()> {
        let mut csv = Writer::from_writer(writer);
        for entry in log {
            csv.serialize(entry)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Writes the audit trail as CSV, one row per kept or removed record.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_audit_csv<W: io::Write>(writer: W, audits: &[MergeAudit]) -> Result<()> {
        let mut csv = Writer::from_writer(writer);
        for audit in audits {
            csv.serialize(AuditRow::new(audit.group_id, "kept", &audit.kept))?;
            for removed in &audit.removed {
                csv.serialize(AuditRow::new(audit.group_id, "removed", removed))?;
            }
        }
        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedupe::{Deduplicator, DeduplicatorConfig};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&[], "Unknown authors")]
    #[case(&["Jane Smith"], "Jane Smith")]
    #[case(&["Jane Smith", "Bob Jones"], "Jane Smith and Bob Jones")]
    #[case(&["Jane Smith", "Bob Jones", "Ann Lee"], "Jane Smith et al.")]
    fn test_format_authors(#[case] authors: &[&str], #[case] expected: &str) {
        assert_eq!(format_authors(&names(authors)), expected);
    }

    fn batch() -> Vec<Record> {
        vec![
            Record {
                identifier: Some("doi:10.1/x".to_string()),
                title: "Foo".to_string(),
                authors: names(&["Jane Smith", "Bob Jones"]),
                ..Default::default()
            },
            Record {
                identifier: Some("doi:10.1/x".to_string()),
                title: "Foo Bar".to_string(),
                publisher: Some("Nature".to_string()),
                date: Some("2020-01-01".to_string()),
                ..Default::default()
            },
            Record {
                identifier: Some("gs-id:abc".to_string()),
                title: "Scholar Paper".to_string(),
                provenance: Some(Provenance::ScholarSearch),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_text_summary() {
        let records = batch();
        let outcome = Deduplicator::new().deduplicate(&records);

        let expected = "\
CITATION DEDUPLICATION SUMMARY
==============================

Total citations: 3
Duplicate groups found: 1
Citations removed: 1
Final citation count: 2
Google Scholar only entries: 1

DETAILS OF DUPLICATE GROUPS
------------------------------

GROUP 1:
  KEPT: \"Foo Bar\"
        by Unknown authors
        in Nature (2020-01-01)
        Score: 4.50
        ID: doi:10.1/x

  REMOVED:
    - \"Foo\"
      by Jane Smith and Bob Jones
      in Unknown source (Unknown date)
      Score: 2.90
      ID: doi:10.1/x

------------------------------

GOOGLE SCHOLAR ONLY ENTRIES
------------------------------

Found 1 entries that exist only in Google Scholar:

1. \"Scholar Paper\"
   by Unknown authors
   in Unknown source (Unknown date)
   ID: gs-id:abc

------------------------------

NOTE: These entries might need to be properly cataloged in your sources.

";
        assert_eq!(text_summary(&records, &outcome), expected);
    }

    #[test]
    fn test_text_summary_without_duplicates() {
        let records = vec![Record {
            title: "Alone".to_string(),
            ..Default::default()
        }];
        let outcome = Deduplicator::new().deduplicate(&records);

        let summary = text_summary(&records, &outcome);
        assert!(summary.contains("Citations removed: 0\n"));
        assert!(summary.contains("Final citation count: 1\n"));
        assert!(summary.ends_with("No duplicates were found and removed.\n"));
    }

    #[test]
    fn test_scholar_only_detection() {
        let records = vec![
            // Also known to the curated sources under the same identifier.
            Record {
                identifier: Some("doi:10.1/a".to_string()),
                provenance: Some(Provenance::ScholarSearch),
                ..Default::default()
            },
            Record {
                identifier: Some("doi:10.1/a".to_string()),
                provenance: Some(Provenance::ManualSources),
                ..Default::default()
            },
            Record {
                identifier: Some("pyOTFWoAAAAJ:u5HHmVD_uO8C".to_string()),
                ..Default::default()
            },
            Record {
                provenance: Some(Provenance::ScholarSearch),
                ..Default::default()
            },
            Record {
                identifier: Some("doi:10.1/b".to_string()),
                provenance: Some(Provenance::Other("orcid.py".to_string())),
                ..Default::default()
            },
        ];

        assert_eq!(scholar_only_indices(&records), vec![2, 3]);
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_write_similarity_csv() {
        let records = vec![
            Record {
                title: "Alpha".to_string(),
                ..Default::default()
            },
            Record {
                title: "Beta, Gamma".to_string(),
                ..Default::default()
            },
        ];
        let outcome = Deduplicator::new().deduplicate(&records);

        let mut buffer = Vec::new();
        write_similarity_csv(&mut buffer, &outcome.similarity_log).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index_a,index_b,title_a,title_b,similarity");
        assert!(lines[1].starts_with("0,1,Alpha,\"Beta, Gamma\","));
        assert_eq!(lines.len(), 2);
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_write_audit_csv() {
        let records = batch();
        let outcome = Deduplicator::new()
            .with_config(DeduplicatorConfig::default())
            .deduplicate(&records);

        let mut buffer = Vec::new();
        write_audit_csv(&mut buffer, &outcome.audits).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "\
group_id,action,index,score,reason,key,identifier,title,authors
1,kept,1,4.5,same_identifier,,doi:10.1/x,Foo Bar,
1,removed,0,2.9,seed,,doi:10.1/x,Foo,Jane Smith; Bob Jones
"
        );
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_write_audit_csv_empty() {
        let mut buffer = Vec::new();
        write_audit_csv(&mut buffer, &[]).unwrap();
        assert!(buffer.is_empty());
    }
}
