//! Record deduplication.
//!
//! A module for collapsing bibliographic records that describe the same work. The
//! batch is grouped with a tiered matching policy, then each group is reduced to
//! its most complete record.
//!
//! ## Usage
//!
//! ### Basic Deduplication
//!
//! ```rust
//! use citemerge::{Record, dedupe::Deduplicator};
//!
//! let records = vec![
//!     Record {
//!         identifier: Some("doi:10.1234/ml.2023.001".to_string()),
//!         title: "Machine Learning Basics".to_string(),
//!         ..Default::default()
//!     },
//!     // Same DOI, different title text
//!     Record {
//!         identifier: Some("doi:10.1234/ml.2023.001".to_string()),
//!         title: "Machine Learning Basics: An Introduction".to_string(),
//!         publisher: Some("Springer".to_string()),
//!         ..Default::default()
//!     },
//! ];
//!
//! let outcome = Deduplicator::new().deduplicate(&records);
//!
//! assert_eq!(outcome.groups.len(), 1);
//! assert_eq!(outcome.records.len(), 1);
//! for audit in &outcome.audits {
//!     println!("Kept: {} ({:.2})", audit.kept.record.title, audit.kept.score);
//!     for removed in &audit.removed {
//!         println!("  Removed: {} ({:.2})", removed.record.title, removed.score);
//!     }
//! }
//! ```
//!
//! ### Custom Configuration
//!
//! ```rust
//! use citemerge::dedupe::{Deduplicator, DeduplicatorConfig};
//!
//! let config = DeduplicatorConfig {
//!     similarity_threshold: 0.9,
//!     run_in_parallel: true,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//!
//! let deduplicator = Deduplicator::new().with_config(config);
//! ```
//!
//! ## Matching Criteria
//!
//! Tiers are applied in order and a record joins at most one group:
//!
//! 1. Records whose identifier starts with the DOI marker and is exactly equal.
//! 2. Titles equal after normalization, or at least 0.99 similar.
//! 3. Titles more than `similarity_threshold` similar whose first authors are
//!    more than 0.9 similar.
//!
//! Records without a title are only ever grouped by DOI.

mod group;
mod merge;

pub use group::{
    DuplicateGroup, GroupMember, Grouping, MatchReason, SimilarityEntry, find_duplicates,
};
pub use merge::{AuditEntry, MergeAudit, MergeOutcome, merge_groups};

use crate::score::ScoreWeights;
use crate::{DOI_MARKER, Record};
use serde::Serialize;
use tracing::info;

/// Configuration options for controlling the deduplication process.
///
/// # Examples
///
/// ```
/// use citemerge::dedupe::DeduplicatorConfig;
///
/// let config = DeduplicatorConfig {
///     similarity_threshold: 0.95,
///     author_threshold: 0.9,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeduplicatorConfig {
    /// Title similarity a pair must exceed (strictly) to be merged on the
    /// similar-title tier.
    pub similarity_threshold: f64,
    /// Similarity at or above which two titles count as identical.
    pub identical_title_threshold: f64,
    /// First-author similarity a pair must exceed (strictly).
    pub author_threshold: f64,
    /// Identifier prefix marking the DOI namespace.
    pub doi_marker: String,
    /// Whether to compute the pairwise title similarities on the rayon pool.
    /// Requires the `parallel` feature; grouping itself stays sequential.
    pub run_in_parallel: bool,
    /// Completeness weights used to pick the record kept from each group.
    pub weights: ScoreWeights,
}

impl Default for DeduplicatorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.95,
            identical_title_threshold: 0.99,
            author_threshold: 0.9,
            doi_marker: DOI_MARKER.to_string(),
            run_in_parallel: false,
            weights: ScoreWeights::default(),
        }
    }
}

impl DeduplicatorConfig {
    /// Checks that every threshold lies in `[0, 1]` and the DOI marker is set.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::ConfigError`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), DedupeError> {
        let thresholds = [
            ("similarity_threshold", self.similarity_threshold),
            ("identical_title_threshold", self.identical_title_threshold),
            ("author_threshold", self.author_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(DedupeError::ConfigError(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.doi_marker.is_empty() {
            return Err(DedupeError::ConfigError(
                "doi_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error types for dedupe operations
#[derive(Debug, thiserror::Error)]
pub enum DedupeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Everything a deduplication run produces.
#[derive(Debug, Clone, Serialize)]
pub struct DedupeOutcome {
    /// The batch with every removed duplicate filtered out, in input order.
    pub records: Vec<Record>,
    /// Duplicate groups in discovery order.
    pub groups: Vec<DuplicateGroup>,
    /// Every title pair compared on the similarity tier.
    pub similarity_log: Vec<SimilarityEntry>,
    /// One audit per group, in the same order as `groups`.
    pub audits: Vec<MergeAudit>,
}

impl DedupeOutcome {
    /// Number of records removed as duplicates.
    pub fn removed_count(&self) -> usize {
        self.audits.iter().map(|audit| audit.removed.len()).sum()
    }
}

/// Core deduplication engine.
///
/// # Examples
///
/// ```
/// use citemerge::dedupe::Deduplicator;
///
/// let deduplicator = Deduplicator::new();
/// let outcome = deduplicator.deduplicate(&[]);
/// assert!(outcome.groups.is_empty());
/// ```
///
/// # Performance
///
/// Title comparison is O(n²) in the batch size; batches are expected to hold
/// hundreds of records.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    config: DeduplicatorConfig,
}

impl Deduplicator {
    /// Creates a new Deduplicator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DeduplicatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &DeduplicatorConfig {
        &self.config
    }

    /// Partitions `records` into groups of duplicates. See [`find_duplicates`].
    pub fn find_duplicates(&self, records: &[Record]) -> Grouping {
        find_duplicates(records, &self.config)
    }

    /// Reduces each group to its most complete record. See [`merge_groups`].
    pub fn merge(&self, records: &[Record], groups: &[DuplicateGroup]) -> MergeOutcome {
        merge_groups(records, groups, &self.config)
    }

    /// Groups and merges `records` in one pass.
    ///
    /// The input is never modified; the returned records are copies.
    pub fn deduplicate(&self, records: &[Record]) -> DedupeOutcome {
        let Grouping {
            groups,
            similarity_log,
        } = self.find_duplicates(records);

        info!(groups = groups.len(), "found groups of duplicate records");

        if groups.is_empty() {
            return DedupeOutcome {
                records: records.to_vec(),
                groups,
                similarity_log,
                audits: Vec::new(),
            };
        }

        let MergeOutcome { records, audits } = self.merge(records, &groups);
        let outcome = DedupeOutcome {
            records,
            groups,
            similarity_log,
            audits,
        };

        info!(
            removed = outcome.removed_count(),
            remaining = outcome.records.len(),
            "deduplicated record list"
        );

        outcome
    }
}
