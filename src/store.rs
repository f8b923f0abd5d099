//! Baseline stores: compressed archives or DuckDB tables

use crate::archive::{ArchiveManager, ArchiveStats, BaselineMetadata};
use crate::config::StoreKind;
use crate::error::{Result, ScoutError};
use crate::snapshot::{DatasetRecord, Snapshot};
use crate::sync::SnapshotStore;
use crate::workspace::ScoutWorkspace;
use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::{params, Connection};
use uuid::Uuid;

/// Baselines kept as `.scout` archives under `.scout/snapshots/`
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    workspace: ScoutWorkspace,
}

impl ArchiveStore {
    pub fn new(workspace: ScoutWorkspace) -> Self {
        Self { workspace }
    }

    pub fn metadata(&self, key: &str) -> Result<BaselineMetadata> {
        let path = self.workspace.archive_path(key);
        if !path.exists() {
            return Err(ScoutError::not_found(key));
        }
        ArchiveManager::read_metadata(&path)
    }

    /// Size and compression of the target's archive
    pub fn archive_stats(&self, key: &str) -> Result<ArchiveStats> {
        let path = self.workspace.archive_path(key);
        if !path.exists() {
            return Err(ScoutError::not_found(key));
        }
        ArchiveManager::get_archive_stats(&path)
    }
}

impl SnapshotStore for ArchiveStore {
    fn load(&self, key: &str) -> Result<Snapshot> {
        let path = self.workspace.archive_path(key);
        if !path.exists() {
            return Err(ScoutError::not_found(key));
        }
        log::debug!("Loading baseline archive {}", path.display());
        ArchiveManager::read_baseline(&path)
    }

    fn save(&self, key: &str, snapshot: &Snapshot, cycle_id: Option<Uuid>) -> Result<()> {
        std::fs::create_dir_all(&self.workspace.snapshots_dir)?;
        let path = self.workspace.archive_path(key);
        let metadata = BaselineMetadata::describe(key, snapshot, cycle_id);
        ArchiveManager::write_baseline(&path, &metadata, snapshot)?;
        log::debug!("Saved baseline archive {}", path.display());
        Ok(())
    }
}

/// Baselines kept as a `baseline` table in one DuckDB file per target
#[derive(Debug, Clone)]
pub struct DuckDbStore {
    workspace: ScoutWorkspace,
}

impl DuckDbStore {
    pub fn new(workspace: ScoutWorkspace) -> Self {
        Self { workspace }
    }

    /// Open the target's database, or `NotFound` if it was never written
    fn open_existing(&self, key: &str) -> Result<Connection> {
        let path = self.workspace.duckdb_path(key);
        if !path.exists() {
            return Err(ScoutError::not_found(key));
        }
        let conn = Connection::open(&path)?;
        if !table_exists(&conn, "baseline")? {
            return Err(ScoutError::not_found(key));
        }
        Ok(conn)
    }

    pub fn metadata(&self, key: &str) -> Result<BaselineMetadata> {
        let conn = self.open_existing(key)?;
        if !table_exists(&conn, "baseline_metadata")? {
            return Err(ScoutError::not_found(key));
        }
        let json: String = conn.query_row("SELECT metadata FROM baseline_metadata LIMIT 1", [], |row| {
            row.get(0)
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl SnapshotStore for DuckDbStore {
    fn load(&self, key: &str) -> Result<Snapshot> {
        let conn = self.open_existing(key)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, last_updated, row_count, column_count, column_names \
             FROM baseline ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, name, description, last_updated, row_count, column_count, column_names) = row?;
            let last_updated = DateTime::parse_from_rfc3339(&last_updated)
                .map_err(|e| ScoutError::invalid_record(format!("{}: bad timestamp: {}", id, e)))?
                .with_timezone(&Utc);
            records.push(DatasetRecord {
                last_updated,
                row_count: to_count(row_count, &id)?,
                column_count: to_count(column_count, &id)?,
                column_names: serde_json::from_str(&column_names)?,
                id,
                name,
                description,
            });
        }

        log::debug!("Loaded {} records from DuckDB baseline for {}", records.len(), key);
        Snapshot::from_records(records)
    }

    fn save(&self, key: &str, snapshot: &Snapshot, cycle_id: Option<Uuid>) -> Result<()> {
        std::fs::create_dir_all(&self.workspace.snapshots_dir)?;
        let mut conn = Connection::open(self.workspace.duckdb_path(key))?;
        let metadata = BaselineMetadata::describe(key, snapshot, cycle_id);

        let tx = conn.transaction()?;
        tx.execute_batch(
            "CREATE OR REPLACE TABLE baseline (
                id VARCHAR PRIMARY KEY,
                name VARCHAR NOT NULL,
                description VARCHAR NOT NULL,
                last_updated VARCHAR NOT NULL,
                row_count BIGINT NOT NULL,
                column_count BIGINT NOT NULL,
                column_names VARCHAR NOT NULL
            );
            CREATE OR REPLACE TABLE baseline_metadata (metadata VARCHAR NOT NULL);",
        )?;

        {
            let mut insert = tx.prepare("INSERT INTO baseline VALUES (?, ?, ?, ?, ?, ?, ?)")?;
            for record in snapshot {
                insert.execute(params![
                    record.id,
                    record.name,
                    record.description,
                    record.last_updated.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    from_count(record.row_count, &record.id)?,
                    from_count(record.column_count, &record.id)?,
                    serde_json::to_string(&record.column_names)?,
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO baseline_metadata VALUES (?)",
            params![serde_json::to_string(&metadata)?],
        )?;
        tx.commit()?;

        log::debug!("Saved {} records to DuckDB baseline for {}", snapshot.len(), key);
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn to_count(value: i64, id: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| ScoutError::invalid_record(format!("{}: negative count {}", id, value)))
}

fn from_count(value: u64, id: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| ScoutError::persist(format!("{}: count {} out of range", id, value)))
}

/// The store configured for a workspace
#[derive(Debug, Clone)]
pub enum BaselineStore {
    Archive(ArchiveStore),
    DuckDb(DuckDbStore),
}

impl BaselineStore {
    pub fn open(kind: StoreKind, workspace: &ScoutWorkspace) -> Self {
        match kind {
            StoreKind::Archive => Self::Archive(ArchiveStore::new(workspace.clone())),
            StoreKind::DuckDb => Self::DuckDb(DuckDbStore::new(workspace.clone())),
        }
    }

    pub fn metadata(&self, key: &str) -> Result<BaselineMetadata> {
        match self {
            Self::Archive(store) => store.metadata(key),
            Self::DuckDb(store) => store.metadata(key),
        }
    }

    /// Metadata if a baseline exists, `None` otherwise
    pub fn try_metadata(&self, key: &str) -> Result<Option<BaselineMetadata>> {
        match self.metadata(key) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl SnapshotStore for BaselineStore {
    fn load(&self, key: &str) -> Result<Snapshot> {
        match self {
            Self::Archive(store) => store.load(key),
            Self::DuckDb(store) => store.load(key),
        }
    }

    fn save(&self, key: &str, snapshot: &Snapshot, cycle_id: Option<Uuid>) -> Result<()> {
        match self {
            Self::Archive(store) => store.save(key, snapshot, cycle_id),
            Self::DuckDb(store) => store.save(key, snapshot, cycle_id),
        }
    }
}
