//! Compressed baseline archives (`.scout` files)
//!
//! A baseline archive is a zstd-compressed tar holding two entries:
//! `metadata.json` with a [`BaselineMetadata`] and `records.json` with the
//! snapshot's records in id order.

use crate::error::{Result, ScoutError};
use crate::hash::HashComputer;
use crate::snapshot::{DatasetRecord, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::{Archive, Builder};
use uuid::Uuid;
use zstd::{Decoder, Encoder};

pub const METADATA_ENTRY: &str = "metadata.json";
pub const RECORDS_ENTRY: &str = "records.json";

const COMPRESSION_LEVEL: i32 = 3;

/// Description of a persisted baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineMetadata {
    pub format_version: String,
    pub target: String,
    pub created: DateTime<Utc>,
    pub record_count: usize,
    pub total_rows: u64,
    pub fingerprint: String,
    /// Sync cycle that wrote the baseline, if any
    #[serde(default)]
    pub cycle_id: Option<Uuid>,
}

impl BaselineMetadata {
    pub fn describe(target: &str, snapshot: &Snapshot, cycle_id: Option<Uuid>) -> Self {
        Self {
            format_version: crate::FORMAT_VERSION.to_string(),
            target: target.to_string(),
            created: Utc::now(),
            record_count: snapshot.len(),
            total_rows: snapshot.total_rows(),
            fingerprint: HashComputer::hash_snapshot(snapshot),
            cycle_id,
        }
    }
}

/// Archive manager for reading and writing .scout files
pub struct ArchiveManager;

impl ArchiveManager {
    /// Write a baseline archive, replacing any previous one atomically
    pub fn write_baseline(path: &Path, metadata: &BaselineMetadata, snapshot: &Snapshot) -> Result<()> {
        let records: Vec<&DatasetRecord> = snapshot.iter().collect();
        let files = vec![
            (METADATA_ENTRY.to_string(), serde_json::to_vec_pretty(metadata)?),
            (RECORDS_ENTRY.to_string(), serde_json::to_vec(&records)?),
        ];

        let tmp_path = temp_path(path);
        if let Err(e) = Self::create_archive(&tmp_path, &files) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Read the records of a baseline archive
    pub fn read_baseline(path: &Path) -> Result<Snapshot> {
        let content = Self::extract_file(path, RECORDS_ENTRY)?.ok_or_else(|| {
            ScoutError::archive(format!("{} has no {}", path.display(), RECORDS_ENTRY))
        })?;

        let records: Vec<DatasetRecord> = serde_json::from_slice(&content).map_err(|_| {
            ScoutError::InvalidSnapshot {
                path: path.to_path_buf(),
            }
        })?;
        Snapshot::from_records(records)
    }

    /// Read only the metadata entry of a baseline archive
    pub fn read_metadata(path: &Path) -> Result<BaselineMetadata> {
        let content = Self::extract_file(path, METADATA_ENTRY)?.ok_or_else(|| {
            ScoutError::archive(format!("{} has no {}", path.display(), METADATA_ENTRY))
        })?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Create a compressed archive from multiple files
    pub fn create_archive<P: AsRef<Path>>(
        archive_path: P,
        files: &[(String, Vec<u8>)], // (filename, content)
    ) -> Result<()> {
        let archive_file = File::create(archive_path)?;
        let mut encoder = Encoder::new(archive_file, COMPRESSION_LEVEL)?;

        {
            let mut tar_builder = Builder::new(&mut encoder);

            for (filename, content) in files {
                let mut header = tar::Header::new_gnu();
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_mtime(Utc::now().timestamp().max(0) as u64);
                header.set_cksum();

                tar_builder.append_data(&mut header, filename, content.as_slice())?;
            }

            tar_builder.finish()?;
        }

        encoder.finish()?.sync_all()?;
        Ok(())
    }

    /// Extract a single file from archive
    pub fn extract_file<P: AsRef<Path>>(archive_path: P, filename: &str) -> Result<Option<Vec<u8>>> {
        let archive_file = File::open(archive_path)?;
        let mut decoder = Decoder::new(archive_file)?;
        let mut archive = Archive::new(&mut decoder);

        for entry in archive.entries()? {
            let mut entry = entry?;
            if entry.path()?.to_string_lossy() == filename {
                let mut content = Vec::new();
                entry.read_to_end(&mut content)?;
                return Ok(Some(content));
            }
        }

        Ok(None)
    }

    /// Get archive size and compression ratio
    pub fn get_archive_stats<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveStats> {
        let archive_file = File::open(&archive_path)?;
        let compressed_size = archive_file.metadata()?.len();

        let mut decoder = Decoder::new(archive_file)?;
        let mut archive = Archive::new(&mut decoder);
        let mut uncompressed_size = 0u64;
        let mut file_count = 0usize;
        for entry in archive.entries()? {
            uncompressed_size += entry?.header().size()?;
            file_count += 1;
        }

        let compression_ratio = if uncompressed_size > 0 {
            compressed_size as f64 / uncompressed_size as f64
        } else {
            1.0
        };

        Ok(ArchiveStats {
            compressed_size,
            uncompressed_size,
            compression_ratio,
            file_count,
        })
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Statistics about an archive
#[derive(Debug, Clone)]
pub struct ArchiveStats {
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub compression_ratio: f64,
    pub file_count: usize,
}

impl ArchiveStats {
    pub fn compression_percentage(&self) -> f64 {
        (1.0 - self.compression_ratio) * 100.0
    }
}
