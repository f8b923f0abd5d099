//! Workspace management for scout operations

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Manages the .scout workspace directory
#[derive(Debug, Clone)]
pub struct ScoutWorkspace {
    /// Project root directory (where .scout/ lives)
    pub root: PathBuf,
    /// .scout/ directory path
    pub scout_dir: PathBuf,
    /// .scout/snapshots/ directory path
    pub snapshots_dir: PathBuf,
    /// .scout/locks/ directory path
    pub locks_dir: PathBuf,
}

impl ScoutWorkspace {
    /// Find an existing workspace, failing if there is none
    pub fn find(start_dir: Option<&Path>) -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        let start = start_dir.unwrap_or(&current_dir);

        Self::find_existing(start)?.ok_or_else(|| {
            ScoutError::workspace(format!(
                "no .scout workspace found from {} (run `scout init`)",
                start.display()
            ))
        })
    }

    /// Find existing .scout workspace by walking up directory tree
    fn find_existing(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir;

        loop {
            let scout_dir = current.join(".scout");
            if scout_dir.is_dir() {
                return Ok(Some(Self::from_root(current.to_path_buf())));
            }

            // A git root bounds the search
            if current.join(".git").exists() {
                break;
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(None)
    }

    /// Create a new workspace in the specified root directory
    pub fn create_new(root: PathBuf) -> Result<Self> {
        let workspace = Self::from_root(root);
        workspace.create_dirs()?;
        workspace.create_config_with_force(false)?;
        workspace.ensure_gitignore()?;

        log::info!("Created scout workspace at: {}", workspace.root.display());

        Ok(workspace)
    }

    /// Create workspace from root directory path
    pub fn from_root(root: PathBuf) -> Self {
        let scout_dir = root.join(".scout");
        let snapshots_dir = scout_dir.join("snapshots");
        let locks_dir = scout_dir.join("locks");

        Self {
            root,
            scout_dir,
            snapshots_dir,
            locks_dir,
        }
    }

    pub fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.scout_dir)?;
        fs::create_dir_all(&self.snapshots_dir)?;
        fs::create_dir_all(&self.locks_dir)?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.scout_dir.join("config.json")
    }

    pub fn load_config(&self) -> Result<ScoutConfig> {
        ScoutConfig::load(&self.config_path())
    }

    pub fn save_config(&self, config: &ScoutConfig) -> Result<()> {
        config.save(&self.config_path())
    }

    /// Write a default config, keeping an existing one unless forced
    pub fn create_config_with_force(&self, force: bool) -> Result<()> {
        let config_path = self.config_path();

        if config_path.exists() && !force {
            return Ok(());
        }

        self.save_config(&ScoutConfig::default())
    }

    /// Path of a target's archive baseline
    pub fn archive_path(&self, key: &str) -> PathBuf {
        self.snapshots_dir.join(format!("{}.scout", file_stem(key)))
    }

    /// Path of a target's DuckDB baseline
    pub fn duckdb_path(&self, key: &str) -> PathBuf {
        self.snapshots_dir.join(format!("{}.duckdb", file_stem(key)))
    }

    /// Path of a target's cycle lock
    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.locks_dir.join(format!("{}.lock", file_stem(key)))
    }

    /// Take the per-target cycle lock; fails if a live cycle already holds it.
    /// A lock left behind by a dead process, or older than [`STALE_LOCK_AGE`],
    /// is reclaimed.
    pub fn lock_target(&self, key: &str) -> Result<TargetLock> {
        fs::create_dir_all(&self.locks_dir)?;
        let path = self.lock_path(key);

        let mut file = match create_lock_file(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && lock_is_stale(&path)? => {
                log::warn!("Reclaiming stale lock {}", path.display());
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                create_lock_file(&path).map_err(|e| lock_error(e, key))?
            }
            Err(e) => return Err(lock_error(e, key)),
        };
        writeln!(file, "{}", std::process::id())?;

        Ok(TargetLock { path })
    }

    /// Ensure .gitignore contains scout entries
    pub fn ensure_gitignore(&self) -> Result<()> {
        let gitignore_path = self.root.join(".gitignore");
        let scout_ignore = "# Ignore scout baselines and cycle locks\n.scout/snapshots/\n.scout/locks/\n";

        if gitignore_path.exists() {
            let content = fs::read_to_string(&gitignore_path)?;
            if !content.contains(".scout/snapshots/") {
                let new_content = if content.ends_with('\n') {
                    format!("{}\n{}", content, scout_ignore)
                } else {
                    format!("{}\n\n{}", content, scout_ignore)
                };
                fs::write(gitignore_path, new_content)?;
                log::info!("Updated .gitignore with scout entries");
            }
        } else {
            fs::write(gitignore_path, scout_ignore)?;
            log::info!("Created .gitignore with scout entries");
        }

        Ok(())
    }

    /// Get workspace statistics
    pub fn stats(&self) -> Result<WorkspaceStats> {
        let mut stats = WorkspaceStats::default();

        if !self.snapshots_dir.exists() {
            return Ok(stats);
        }

        for entry in WalkDir::new(&self.snapshots_dir) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let size = entry.metadata()?.len();
            match entry.path().extension().and_then(|e| e.to_str()) {
                Some("scout") => {
                    stats.archive_count += 1;
                    stats.total_archive_size += size;
                }
                Some("duckdb") => {
                    stats.duckdb_count += 1;
                    stats.total_duckdb_size += size;
                }
                _ => {}
            }
        }

        Ok(stats)
    }
}

/// Map a target key to a safe file stem
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Locks older than this are treated as abandoned
pub const STALE_LOCK_AGE: Duration = Duration::from_secs(6 * 60 * 60);

fn create_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn lock_error(e: io::Error, key: &str) -> ScoutError {
    if e.kind() == io::ErrorKind::AlreadyExists {
        ScoutError::TargetBusy {
            target: key.to_string(),
        }
    } else {
        e.into()
    }
}

/// A lock is stale when it outlived [`STALE_LOCK_AGE`] or its recorded
/// process is gone. A lock whose pid is not written yet is still live.
fn lock_is_stale(path: &Path) -> Result<bool> {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };
    if modified.elapsed().unwrap_or_default() > STALE_LOCK_AGE {
        return Ok(true);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };
    Ok(match content.trim().parse::<u32>() {
        Ok(pid) => !process_is_running(pid),
        Err(_) => false,
    })
}

#[cfg(target_os = "linux")]
fn process_is_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

// No cheap liveness check elsewhere; only the age bound applies
#[cfg(not(target_os = "linux"))]
fn process_is_running(_pid: u32) -> bool {
    true
}

/// Exclusive claim on one target for the duration of a sync cycle
#[derive(Debug)]
pub struct TargetLock {
    path: PathBuf,
}

impl TargetLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

/// Statistics about the workspace
#[derive(Debug, Default)]
pub struct WorkspaceStats {
    pub archive_count: usize,
    pub duckdb_count: usize,
    pub total_archive_size: u64,
    pub total_duckdb_size: u64,
}
