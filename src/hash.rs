//! Hashing utilities for snapshot fingerprints

use crate::snapshot::{DatasetRecord, Snapshot};
use blake3::Hasher;

/// A hash value represented as a hex string
pub type HashValue = String;

/// Computes content fingerprints of snapshots
pub struct HashComputer;

impl HashComputer {
    /// Fingerprint a whole snapshot in id order
    pub fn hash_snapshot(snapshot: &Snapshot) -> HashValue {
        let mut hasher = Hasher::new();
        for record in snapshot {
            Self::update_record(&mut hasher, record);
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }

    fn update_record(hasher: &mut Hasher, record: &DatasetRecord) {
        for field in [&record.id, &record.name, &record.description] {
            hasher.update(field.as_bytes());
            hasher.update(b"|");
        }
        hasher.update(record.last_updated.to_rfc3339().as_bytes());
        hasher.update(b"|");
        hasher.update(&record.row_count.to_le_bytes());
        hasher.update(&record.column_count.to_le_bytes());
        for column in &record.column_names {
            hasher.update(column.as_bytes());
            hasher.update(b",");
        }
    }
}

/// Short form of a fingerprint for display
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
