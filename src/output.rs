//! Output formatting utilities

use crate::archive::{ArchiveStats, BaselineMetadata};
use crate::error::Result;
use crate::hash::short_hash;
use crate::report::ChangeReport;
use crate::sync::SyncOutcome;
use crate::workspace::WorkspaceStats;
use serde::Serialize;

/// One configured target and the state of its baseline
#[derive(Debug, Clone, Serialize)]
pub struct TargetStatus {
    pub name: String,
    pub domain: String,
    pub webhook: bool,
    pub baseline: Option<BaselineMetadata>,
}

/// Pretty printer for scout output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print workspace statistics
    pub fn print_workspace_stats(stats: &WorkspaceStats) {
        println!("📊 Scout Workspace Statistics");
        println!("├─ Archive baselines: {} ({})", stats.archive_count, format_bytes(stats.total_archive_size));
        println!("└─ DuckDB baselines: {} ({})", stats.duckdb_count, format_bytes(stats.total_duckdb_size));
    }

    /// Print configured targets
    pub fn print_target_list(targets: &[TargetStatus]) {
        if targets.is_empty() {
            println!("No targets configured.");
            return;
        }

        println!("🛰  Watched catalogs:");
        for (i, target) in targets.iter().enumerate() {
            let prefix = if i == targets.len() - 1 { "└─" } else { "├─" };
            let baseline = match &target.baseline {
                Some(meta) => format!("{} datasets, saved {}", meta.record_count, meta.created.format("%Y-%m-%d %H:%M")),
                None => "no baseline yet".to_string(),
            };
            let channel = if target.webhook { "slack" } else { "console" };
            println!("{} {} ({}) [{}] {}", prefix, target.name, target.domain, channel, baseline);
        }
    }

    /// Print baseline metadata
    pub fn print_baseline(name: &str, metadata: &BaselineMetadata) {
        println!("📸 Baseline: {}", name);
        println!("├─ Target: {}", metadata.target);
        println!("├─ Saved: {}", metadata.created);
        println!("├─ Datasets: {}", metadata.record_count);
        println!("├─ Total rows: {}", metadata.total_rows);
        if let Some(cycle_id) = metadata.cycle_id {
            println!("├─ Written by cycle: {}", cycle_id);
        }
        println!("└─ Fingerprint: {}", short_hash(&metadata.fingerprint));
    }

    /// Print archive size details
    pub fn print_archive_stats(stats: &ArchiveStats) {
        println!("📦 Archive");
        println!("├─ Entries: {}", stats.file_count);
        println!("├─ Compressed: {}", format_bytes(stats.compressed_size));
        println!("├─ Uncompressed: {}", format_bytes(stats.uncompressed_size));
        println!("└─ Saved: {:.1}%", stats.compression_percentage());
    }

    /// Print the outcome of one sync cycle
    pub fn print_outcome(target: &str, outcome: &SyncOutcome, verbose: bool) {
        match outcome {
            SyncOutcome::BaselineEstablished { records } => {
                println!("✅ {}: baseline established with {} datasets", target, records);
            }
            SyncOutcome::NoChange => {
                println!("✅ {}: no change", target);
            }
            SyncOutcome::NothingToReport { summary } => {
                println!(
                    "✅ {}: catalog changed but nothing to report ({} changes)",
                    target,
                    summary.total_changes()
                );
            }
            SyncOutcome::Delivered { report } => {
                println!(
                    "📣 {}: report delivered ({} added, {} removed, {} modified)",
                    target, report.summary.added, report.summary.removed, report.summary.modified
                );
                if verbose && !report.headline_text.is_empty() {
                    println!("│  Headline:");
                    Self::print_indented(&report.headline_text);
                }
            }
            SyncOutcome::DryRun { report, baseline_exists } => {
                if !baseline_exists {
                    println!("🔍 {}: dry run, no baseline yet (a real run would establish it)", target);
                } else if report.is_empty() {
                    println!("🔍 {}: dry run, nothing to report", target);
                } else {
                    println!("🔍 {}: dry run, report would be:", target);
                    Self::print_report(report);
                }
            }
        }
    }

    /// Print a change report
    pub fn print_report(report: &ChangeReport) {
        if report.is_empty() {
            println!("✅ Nothing to report");
            return;
        }
        Self::print_indented(&report.primary_text);
        println!(
            "└─ {} added, {} removed, {} modified",
            report.summary.added, report.summary.removed, report.summary.modified
        );
    }

    fn print_indented(text: &str) {
        for line in text.lines() {
            println!("│  {}", line);
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Format bytes in human-readable format
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
