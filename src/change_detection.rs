//! Row-level and cell-level change detection between two catalog snapshots

use crate::snapshot::{DatasetRecord, Snapshot};
use serde::Serialize;
use std::collections::BTreeSet;

/// Datasets that appeared or disappeared between two snapshots
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowDiff {
    pub added: Vec<DatasetRecord>,
    pub removed: Vec<DatasetRecord>,
    pub common_ids: BTreeSet<String>,
}

/// Numeric change for a dataset present in both snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDelta {
    pub id: String,
    pub name: String,
    pub row_count_delta: i64,
}

/// Numeric fields whose change is worth reporting.
///
/// `column_count` is not tracked, so a column count change alone never
/// produces a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    RowCount,
}

impl TrackedField {
    pub const ALL: &'static [TrackedField] = &[TrackedField::RowCount];

    fn value(&self, record: &DatasetRecord) -> i64 {
        match self {
            TrackedField::RowCount => i64::try_from(record.row_count).unwrap_or(i64::MAX),
        }
    }

    /// Signed change of this field from `old` to `new`
    pub fn delta(&self, old: &DatasetRecord, new: &DatasetRecord) -> i64 {
        self.value(new).saturating_sub(self.value(old))
    }
}

/// Change detector for catalog snapshots
pub struct ChangeDetector;

impl ChangeDetector {
    /// Split ids into added, removed and common
    pub fn diff_rows(old: &Snapshot, new: &Snapshot) -> RowDiff {
        let added = new
            .iter()
            .filter(|record| !old.contains(&record.id))
            .cloned()
            .collect();

        let removed = old
            .iter()
            .filter(|record| !new.contains(&record.id))
            .cloned()
            .collect();

        let common_ids = new
            .iter()
            .filter(|record| old.contains(&record.id))
            .map(|record| record.id.clone())
            .collect();

        RowDiff {
            added,
            removed,
            common_ids,
        }
    }

    /// Compute numeric deltas for common ids, dropping ids with no tracked change
    pub fn diff_cells(old: &Snapshot, new: &Snapshot, common_ids: &BTreeSet<String>) -> Vec<CellDelta> {
        common_ids
            .iter()
            .filter_map(|id| {
                // An id missing on either side has nothing to subtract
                let before = old.get(id)?;
                let after = new.get(id)?;

                let changed = TrackedField::ALL
                    .iter()
                    .any(|field| field.delta(before, after) != 0);
                if !changed {
                    return None;
                }

                Some(CellDelta {
                    id: id.clone(),
                    name: after.name.clone(),
                    row_count_delta: TrackedField::RowCount.delta(before, after),
                })
            })
            .collect()
    }
}

/// Convenience wrapper around [`ChangeDetector::diff_rows`]
pub fn diff_rows(old: &Snapshot, new: &Snapshot) -> RowDiff {
    ChangeDetector::diff_rows(old, new)
}

/// Convenience wrapper around [`ChangeDetector::diff_cells`]
pub fn diff_cells(old: &Snapshot, new: &Snapshot, common_ids: &BTreeSet<String>) -> Vec<CellDelta> {
    ChangeDetector::diff_cells(old, new, common_ids)
}

/// Counts of each kind of change, for logs and console output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl ChangeSummary {
    pub fn new(rows: &RowDiff, cells: &[CellDelta]) -> Self {
        Self {
            added: rows.added.len(),
            removed: rows.removed.len(),
            modified: cells.len(),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified
    }
}
