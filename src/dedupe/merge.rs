//! Reduction of duplicate groups to their most complete record.

use crate::Record;
use crate::dedupe::{DeduplicatorConfig, DuplicateGroup, MatchReason};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A scored group member as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Index of the record in the input batch.
    pub index: usize,
    pub score: f64,
    pub reason: MatchReason,
    pub record: Record,
}

/// The decision taken for one duplicate group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeAudit {
    /// Position of the group, starting at 1.
    pub group_id: usize,
    pub kept: AuditEntry,
    /// Removed members, highest score first.
    pub removed: Vec<AuditEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    /// Input records minus the removed members, in input order.
    pub records: Vec<Record>,
    pub audits: Vec<MergeAudit>,
}

/// Keeps the highest scoring member of each group and removes the others.
///
/// Members are ranked by completeness score, highest first; ties go to the member
/// listed first in the group. Indices outside `records` are ignored, and groups
/// left with no members produce no audit.
pub fn merge_groups(
    records: &[Record],
    groups: &[DuplicateGroup],
    config: &DeduplicatorConfig,
) -> MergeOutcome {
    let mut removed_indices = HashSet::new();
    let mut audits = Vec::with_capacity(groups.len());

    for (position, group) in groups.iter().enumerate() {
        let mut scored: Vec<AuditEntry> = group
            .members
            .iter()
            .filter_map(|member| {
                let record = records.get(member.index)?;
                Some(AuditEntry {
                    index: member.index,
                    score: config.weights.score(record, &config.doi_marker),
                    reason: member.reason,
                    record: record.clone(),
                })
            })
            .collect();

        // Stable, so equal scores keep group order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut ranked = scored.into_iter();
        let Some(kept) = ranked.next() else {
            continue;
        };
        let removed: Vec<AuditEntry> = ranked.collect();

        debug!(
            group_id = position + 1,
            index = kept.index,
            score = kept.score,
            title = %kept.record.title,
            "keeping record"
        );
        for entry in &removed {
            debug!(
                group_id = position + 1,
                index = entry.index,
                score = entry.score,
                title = %entry.record.title,
                "removing duplicate"
            );
            removed_indices.insert(entry.index);
        }

        audits.push(MergeAudit {
            group_id: position + 1,
            kept,
            removed,
        });
    }

    let records = records
        .iter()
        .enumerate()
        .filter(|(index, _)| !removed_indices.contains(index))
        .map(|(_, record)| record.clone())
        .collect();

    MergeOutcome { records, audits }
}
