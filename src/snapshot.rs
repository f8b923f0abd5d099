//! Dataset records and immutable catalog snapshots

use crate::error::{Result, ScoutError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{BTreeMap, Values};
use std::collections::BTreeSet;
use std::path::Path;

/// One catalog entry at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    /// Free text; empty when the catalog has no description
    #[serde(default)]
    pub description: String,
    pub last_updated: DateTime<Utc>,
    pub row_count: u64,
    pub column_count: u64,
    #[serde(default)]
    pub column_names: Vec<String>,
}

impl DatasetRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            last_updated,
            row_count: 0,
            column_count: 0,
            column_names: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_row_count(mut self, row_count: u64) -> Self {
        self.row_count = row_count;
        self
    }

    /// Set the column list; the column count follows it
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.column_count = columns.len() as u64;
        self.column_names = columns;
        self
    }

    pub fn with_column_count(mut self, column_count: u64) -> Self {
        self.column_count = column_count;
        self
    }
}

/// Immutable id-keyed collection of records, iterated in id order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: BTreeMap<String, DatasetRecord>,
}

impl Snapshot {
    /// Build a snapshot, rejecting empty and duplicate ids
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = DatasetRecord>,
    {
        let mut map = BTreeMap::new();

        for record in records {
            if record.id.trim().is_empty() {
                return Err(ScoutError::invalid_record(format!(
                    "dataset '{}' has an empty id",
                    record.name
                )));
            }
            if map.contains_key(&record.id) {
                return Err(ScoutError::invalid_record(format!(
                    "duplicate dataset id '{}'",
                    record.id
                )));
            }
            map.insert(record.id.clone(), record);
        }

        Ok(Self { records: map })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DatasetRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Records in ascending id order
    pub fn iter(&self) -> Values<'_, String, DatasetRecord> {
        self.records.values()
    }

    pub fn ids(&self) -> BTreeSet<String> {
        self.records.keys().cloned().collect()
    }

    /// Total rows across every dataset in the snapshot
    pub fn total_rows(&self) -> u64 {
        self.records.values().map(|r| r.row_count).sum()
    }

    /// Parse a JSON array of records
    pub fn from_json(content: &str) -> Result<Self> {
        let records: Vec<DatasetRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    pub fn to_json(&self) -> Result<String> {
        let records: Vec<&DatasetRecord> = self.records.values().collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Load a snapshot exported with `scout export`
    pub fn load_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScoutError::invalid_input(format!(
                "Snapshot file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| match e {
            ScoutError::Json(_) => ScoutError::InvalidSnapshot {
                path: path.to_path_buf(),
            },
            other => other,
        })
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a DatasetRecord;
    type IntoIter = Values<'a, String, DatasetRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
