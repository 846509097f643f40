//! CSV record reader.
//!
//! This module turns CSV exports of bibliographies into [`Record`]s, with configurable
//! header mappings.
//!
//! # Example
//!
//! ```
//! use citemerge::{CsvParser, RecordParser};
//!
//! let input = "Title,Authors,DOI\nExample Paper,Jane Smith; Bob Jones,https://doi.org/10.1/X";
//!
//! let parser = CsvParser::new();
//!
//! let records = parser.parse(input).unwrap();
//! assert_eq!(records[0].title, "Example Paper");
//! assert_eq!(records[0].authors.len(), 2);
//! assert_eq!(records[0].identifier.as_deref(), Some("doi:10.1/x"));
//! ```

use csv_crate::{ReaderBuilder, StringRecord};
use nanoid::nanoid;
use std::collections::HashMap;
use tracing::debug;

use crate::utils::{canonical_identifier, split_authors};
use crate::{Provenance, Record, RecordError, RecordParser, Result};

/// Default header mappings for common CSV column names
const DEFAULT_HEADERS: &[(&str, &[&str])] = &[
    ("key", &["key", "citation key", "citation_key"]),
    ("identifier", &["id", "identifier", "doi"]),
    ("title", &["title", "article title", "publication title"]),
    ("authors", &["author", "authors", "creator", "creators"]),
    (
        "publisher",
        &["publisher", "journal", "venue", "source title"],
    ),
    ("date", &["date", "year", "publication date", "published"]),
    ("link", &["link", "url", "web link"]),
    ("group", &["group", "label", "type"]),
    ("description", &["description", "abstract", "summary"]),
    ("image", &["image", "thumbnail"]),
    ("provenance", &["plugin", "provenance", "source"]),
];

/// Configuration for CSV parsing with custom header mappings.
///
/// # Default Mappings
///
/// The default configuration includes mappings for common column names:
/// - "identifier" → ["id", "identifier", "doi"]
/// - "authors" → ["author", "authors", "creator", "creators"]
/// - "publisher" → ["publisher", "journal", "venue", "source title"]
///   etc.
///
/// # Examples
///
/// ```
/// use citemerge::csv::CsvConfig;
///
/// let mut config = CsvConfig::new();
/// config.set_header_mapping("title", vec!["Article Name".to_string()]);
/// config.set_delimiter(b';');
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Custom header mappings for CSV columns
    header_map: HashMap<String, Vec<String>>,
    /// Delimiter to use for parsing the CSV
    delimiter: u8,
    /// Whether the CSV has headers
    has_header: bool,
    /// Separator between names in the authors column
    author_separator: char,
    /// Whether rows longer than the header are tolerated
    flexible: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfig {
    /// Creates a new CSV configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        let mut config = Self {
            header_map: HashMap::new(),
            delimiter: b',',
            has_header: true,
            author_separator: ';',
            flexible: false,
        };
        config.set_default_headers();
        config
    }

    fn set_default_headers(&mut self) {
        for (field, aliases) in DEFAULT_HEADERS {
            self.header_map.insert(
                field.to_string(),
                aliases.iter().map(|s| s.to_string()).collect(),
            );
        }
    }

    /// Sets a custom header mapping, replacing the aliases of `field`
    pub fn set_header_mapping(&mut self, field: &str, aliases: Vec<String>) -> &mut Self {
        self.header_map.insert(field.to_string(), aliases);
        self
    }

    /// Sets the delimiter character
    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether the CSV has headers
    pub fn set_has_header(&mut self, has_header: bool) -> &mut Self {
        self.has_header = has_header;
        self
    }

    /// Sets the separator between author names
    pub fn set_author_separator(&mut self, separator: char) -> &mut Self {
        self.author_separator = separator;
        self
    }

    /// Sets whether rows with more fields than headers are accepted. Extra
    /// fields are then ignored.
    pub fn set_flexible(&mut self, flexible: bool) -> &mut Self {
        self.flexible = flexible;
        self
    }

    /// Finds the field name for a given header
    fn get_field_for_header(&self, header: &str) -> Option<&str> {
        let header = header.trim().to_lowercase();
        self.header_map
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.to_lowercase() == header))
            .map(|(field, _)| field.as_str())
    }
}

/// Parser for CSV-formatted bibliographies.
///
/// Empty cells leave their field missing. Rows without a key get a random one.
///
/// # Examples
///
/// ```
/// use citemerge::csv::{CsvConfig, CsvParser};
///
/// let mut config = CsvConfig::new();
/// config.set_delimiter(b';').set_author_separator('|');
///
/// let parser = CsvParser::new().with_config(config);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    config: CsvConfig,
}

impl CsvParser {
    /// Creates a new CSV parser with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CSV parser with custom configuration
    #[must_use]
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    fn parse_record(&self, headers: &[String], row: &StringRecord, line: usize) -> Result<Record> {
        if row.len() > headers.len() && !self.config.flexible {
            return Err(RecordError::MalformedInput {
                message: format!(
                    "Record has more fields ({}) than headers ({})",
                    row.len(),
                    headers.len()
                ),
                line,
            });
        }

        let mut record = Record::default();

        for (header, value) in headers.iter().zip(row.iter()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let Some(field) = self.config.get_field_for_header(header) else {
                continue;
            };

            match field {
                "key" => record.key = value.to_string(),
                "identifier" => record.identifier = canonical_identifier(value),
                "title" => record.title = value.to_string(),
                "authors" => {
                    record
                        .authors
                        .extend(split_authors(value, self.config.author_separator));
                }
                "publisher" => record.publisher = Some(value.to_string()),
                "date" => record.date = Some(value.to_string()),
                "link" => record.link = Some(value.to_string()),
                "group" => record.group = Some(value.to_string()),
                "description" => record.description = Some(value.to_string()),
                "image" => record.image = Some(value.to_string()),
                "provenance" => record.provenance = Some(Provenance::from(value)),
                _ => {}
            }
        }

        if record.key.is_empty() {
            record.key = nanoid!();
        }

        Ok(record)
    }
}

impl RecordParser for CsvParser {
    fn parse(&self, input: &str) -> Result<Vec<Record>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_reader(input.as_bytes());

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(String::from).collect()
        } else {
            // Use column numbers as headers if no headers present
            (0..reader.headers()?.len())
                .map(|i| format!("Column{}", i + 1))
                .collect()
        };

        let first_line = if self.config.has_header { 2 } else { 1 };
        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let line = row
                .position()
                .map_or(first_line + index, |position| position.line() as usize);
            records.push(self.parse_record(&headers, &row, line)?);
        }

        debug!(records = records.len(), "parsed CSV input");
        Ok(records)
    }
}
