//! Per-target sync cycle: load or establish the baseline, fetch, diff,
//! notify, and advance the baseline only after confirmed delivery.

use crate::change_detection::ChangeSummary;
use crate::config::TargetConfig;
use crate::error::{Result, ScoutError};
use crate::report::{assemble_report, ChangeReport, ReportConfig};
use crate::snapshot::Snapshot;
use rand::Rng;
use uuid::Uuid;

/// Source of current catalog snapshots
pub trait CatalogFetcher {
    fn fetch_snapshot(&self, target: &TargetConfig) -> Result<Snapshot>;
}

/// Persistence of the baseline snapshot, keyed by target
pub trait SnapshotStore {
    /// Fails with `ScoutError::NotFound` when no baseline exists
    fn load(&self, key: &str) -> Result<Snapshot>;

    fn save(&self, key: &str, snapshot: &Snapshot, cycle_id: Option<Uuid>) -> Result<()>;
}

/// Delivery of report text to a channel
pub trait Notifier {
    fn send(&self, text: &str) -> Result<()>;
}

/// Where a target stands at the start of a cycle
#[derive(Debug)]
pub enum SyncState {
    NoPriorSnapshot,
    SnapshotExists(Snapshot),
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// First run: the fetched snapshot became the baseline, nothing was sent
    BaselineEstablished { records: usize },
    /// Fetched snapshot equals the baseline
    NoChange,
    /// Snapshots differ but not in a reportable way; baseline kept
    NothingToReport { summary: ChangeSummary },
    /// Report sent and the new snapshot committed as baseline
    Delivered { report: ChangeReport },
    /// Dry run: report built, nothing sent or saved
    DryRun { report: ChangeReport, baseline_exists: bool },
}

/// Runs sync cycles for one target against its collaborators
pub struct SyncController<'a> {
    target: &'a TargetConfig,
    fetcher: &'a dyn CatalogFetcher,
    store: &'a dyn SnapshotStore,
    notifier: &'a dyn Notifier,
    report_config: ReportConfig,
    dry_run: bool,
}

impl<'a> SyncController<'a> {
    pub fn new(
        target: &'a TargetConfig,
        fetcher: &'a dyn CatalogFetcher,
        store: &'a dyn SnapshotStore,
        notifier: &'a dyn Notifier,
        report_config: ReportConfig,
    ) -> Self {
        Self {
            target,
            fetcher,
            store,
            notifier,
            report_config,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Load the baseline; a missing baseline is a state, not a failure
    pub fn load_state(&self) -> Result<SyncState> {
        match self.store.load(self.target.key()) {
            Ok(snapshot) => Ok(SyncState::SnapshotExists(snapshot)),
            Err(e) if e.is_not_found() => Ok(SyncState::NoPriorSnapshot),
            Err(e) => Err(e),
        }
    }

    /// Run one cycle
    pub fn run_cycle<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SyncOutcome> {
        let cycle_id = Uuid::new_v4();
        let key = self.target.key();
        log::info!("[{}] {}: starting sync cycle", cycle_id, key);

        let state = self.load_state()?;
        let current = self.fetcher.fetch_snapshot(self.target)?;
        log::info!("[{}] {}: fetched {} datasets", cycle_id, key, current.len());

        let baseline = match state {
            SyncState::NoPriorSnapshot => {
                if self.dry_run {
                    log::info!("[{}] {}: no baseline yet, dry run leaves it unset", cycle_id, key);
                    return Ok(SyncOutcome::DryRun {
                        report: ChangeReport::default(),
                        baseline_exists: false,
                    });
                }
                self.commit(&current, cycle_id)?;
                log::info!("[{}] {}: baseline established", cycle_id, key);
                return Ok(SyncOutcome::BaselineEstablished {
                    records: current.len(),
                });
            }
            SyncState::SnapshotExists(baseline) => baseline,
        };

        if baseline == current {
            log::info!("[{}] {}: no change", cycle_id, key);
            return Ok(SyncOutcome::NoChange);
        }

        let report = assemble_report(&baseline, &current, &self.report_config, rng);
        log::info!(
            "[{}] {}: {} added, {} removed, {} modified",
            cycle_id,
            key,
            report.summary.added,
            report.summary.removed,
            report.summary.modified
        );
        if !report.headline_text.is_empty() {
            log::debug!("[{}] {}: headline:\n{}", cycle_id, key, report.headline_text);
        }

        if self.dry_run {
            return Ok(SyncOutcome::DryRun {
                report,
                baseline_exists: true,
            });
        }

        if report.is_empty() {
            log::info!("[{}] {}: nothing to report, baseline kept", cycle_id, key);
            return Ok(SyncOutcome::NothingToReport {
                summary: report.summary,
            });
        }

        if let Err(e) = self.notifier.send(&report.primary_text) {
            log::warn!("[{}] {}: notification failed, baseline kept: {}", cycle_id, key, e);
            return Err(match e {
                ScoutError::NotifyFailure { .. } => e,
                other => ScoutError::notify(other.to_string()),
            });
        }

        self.commit(&current, cycle_id)?;
        log::info!("[{}] {}: report delivered, baseline advanced", cycle_id, key);

        Ok(SyncOutcome::Delivered { report })
    }

    fn commit(&self, snapshot: &Snapshot, cycle_id: Uuid) -> Result<()> {
        self.store
            .save(self.target.key(), snapshot, Some(cycle_id))
            .map_err(|e| match e {
                ScoutError::PersistFailure { .. } => e,
                other => ScoutError::persist(other.to_string()),
            })
    }
}
