//! Tiered duplicate grouping.

use crate::Record;
use crate::dedupe::DeduplicatorConfig;
use crate::normalize::normalize_title;
use crate::similarity::{first_author_similarity, similarity};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Why a record joined its group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchReason {
    /// The first member of the group, which the others were compared against.
    Seed,
    /// Shares the seed's DOI identifier.
    SameIdentifier,
    /// Title equal to the seed's after normalization, or nearly so.
    IdenticalTitle { similarity: f64 },
    /// Title similar to the seed's, confirmed by the first authors.
    SimilarTitle {
        similarity: f64,
        author_similarity: f64,
    },
}

impl MatchReason {
    /// Short snake_case name of the reason.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchReason::Seed => "seed",
            MatchReason::SameIdentifier => "same_identifier",
            MatchReason::IdenticalTitle { .. } => "identical_title",
            MatchReason::SimilarTitle { .. } => "similar_title",
        }
    }
}

/// A record index within the batch together with the reason it was grouped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupMember {
    pub index: usize,
    pub reason: MatchReason,
}

/// Records believed to denote the same work, in the order they were matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Batch indices of the members.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|member| member.index)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A title pair compared on the similarity tier.
///
/// Kept for every such comparison, whether or not it led to a merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityEntry {
    pub index_a: usize,
    pub index_b: usize,
    pub title_a: String,
    pub title_b: String,
    /// Similarity of the normalized titles.
    pub similarity: f64,
}

/// The result of grouping a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grouping {
    /// Disjoint groups of two or more records, in discovery order.
    pub groups: Vec<DuplicateGroup>,
    pub similarity_log: Vec<SimilarityEntry>,
}

/// Partitions `records` into groups of duplicates.
///
/// Tiers run in a fixed order and every record joins at most one group:
///
/// 1. **Identifier.** Records whose identifier starts with the DOI marker are
///    bucketed by exact identifier. Buckets of two or more become groups, and their
///    members take no part in the later tiers.
/// 2. **Title.** Each remaining titled record, in batch order, seeds a candidate
///    group and is compared against every later unused titled record. A title equal
///    to the seed's after normalization, or at least `identical_title_threshold`
///    similar to it, joins outright. Otherwise the pair goes to
///    the similarity log, and joins when the title similarity exceeds
///    `similarity_threshold` and the first authors are more than `author_threshold`
///    similar. Candidates that end up alone are dropped.
///
/// Records with neither a title nor a shared DOI are never grouped.
pub fn find_duplicates(records: &[Record], config: &DeduplicatorConfig) -> Grouping {
    let mut used = vec![false; records.len()];
    let mut grouping = Grouping::default();

    for group in identifier_groups(records, &config.doi_marker) {
        for index in group.indices() {
            used[index] = true;
        }
        debug!(tier = "identifier", size = group.len(), "duplicate group");
        grouping.groups.push(group);
    }

    let titles = TitleSimilarities::new(records, &used, config.run_in_parallel);

    for i in 0..records.len() {
        if used[i] || records[i].title.is_empty() {
            continue;
        }

        used[i] = true;
        let mut members = vec![GroupMember {
            index: i,
            reason: MatchReason::Seed,
        }];

        for j in (i + 1)..records.len() {
            if used[j] || records[j].title.is_empty() {
                continue;
            }

            let score = titles.get(i, j);
            if titles.normalized[i] == titles.normalized[j] {
                members.push(GroupMember {
                    index: j,
                    reason: MatchReason::IdenticalTitle { similarity: 1.0 },
                });
                used[j] = true;
                continue;
            }
            if score >= config.identical_title_threshold {
                members.push(GroupMember {
                    index: j,
                    reason: MatchReason::IdenticalTitle { similarity: score },
                });
                used[j] = true;
                continue;
            }

            trace!(i, j, similarity = score, "compared titles");
            grouping.similarity_log.push(SimilarityEntry {
                index_a: i,
                index_b: j,
                title_a: records[i].title.clone(),
                title_b: records[j].title.clone(),
                similarity: score,
            });

            if score <= config.similarity_threshold {
                continue;
            }
            let author_similarity =
                first_author_similarity(&records[i].authors, &records[j].authors)
                    .filter(|s| *s > config.author_threshold);
            if let Some(author_similarity) = author_similarity {
                members.push(GroupMember {
                    index: j,
                    reason: MatchReason::SimilarTitle {
                        similarity: score,
                        author_similarity,
                    },
                });
                used[j] = true;
            }
        }

        if members.len() > 1 {
            debug!(tier = "title", size = members.len(), "duplicate group");
            grouping.groups.push(DuplicateGroup { members });
        }
    }

    grouping
}

/// Groups of records sharing an identical DOI identifier, ordered by the first
/// appearance of each identifier.
fn identifier_groups(records: &[Record], doi_marker: &str) -> Vec<DuplicateGroup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(doi) = record.doi_identifier(doi_marker) else {
            continue;
        };
        let position = *positions.entry(doi).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[position].push(index);
    }

    buckets
        .into_iter()
        .filter(|bucket| bucket.len() > 1)
        .map(|bucket| DuplicateGroup {
            members: bucket
                .into_iter()
                .enumerate()
                .map(|(position, index)| GroupMember {
                    index,
                    reason: if position == 0 {
                        MatchReason::Seed
                    } else {
                        MatchReason::SameIdentifier
                    },
                })
                .collect(),
        })
        .collect()
}

/// Normalized titles of a batch and, optionally, their precomputed pairwise
/// similarities.
struct TitleSimilarities {
    normalized: Vec<String>,
    /// `rows[i][j - i - 1]` holds the similarity of titles `i < j`.
    rows: Option<Vec<Vec<f64>>>,
}

impl TitleSimilarities {
    fn new(records: &[Record], used: &[bool], run_in_parallel: bool) -> Self {
        let normalized: Vec<String> = records.iter().map(|r| normalize_title(&r.title)).collect();
        let candidates: Vec<bool> = records
            .iter()
            .zip(used)
            .map(|(record, used)| !used && !record.title.is_empty())
            .collect();

        let rows = if run_in_parallel {
            Self::precompute(&normalized, &candidates)
        } else {
            None
        };

        Self { normalized, rows }
    }

    #[cfg(feature = "parallel")]
    fn precompute(normalized: &[String], candidates: &[bool]) -> Option<Vec<Vec<f64>>> {
        use rayon::prelude::*;

        let n = normalized.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .map(|j| {
                        if candidates[i] && candidates[j] {
                            similarity(&normalized[i], &normalized[j])
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();
        Some(rows)
    }

    #[cfg(not(feature = "parallel"))]
    fn precompute(_normalized: &[String], _candidates: &[bool]) -> Option<Vec<Vec<f64>>> {
        debug!("parallel feature disabled, comparing titles sequentially");
        None
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        match &self.rows {
            Some(rows) => rows[i][j - i - 1],
            None => similarity(&self.normalized[i], &self.normalized[j]),
        }
    }
}
