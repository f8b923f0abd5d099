//! Command-line interface for scout

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Watches open-data catalogs and reports dataset changes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override workspace location
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize scout workspace
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,

        /// Baseline store: "archive" or "duckdb"
        #[arg(long, default_value = "archive")]
        store: String,
    },

    /// Add a catalog to watch
    AddTarget {
        /// Display name of the catalog
        #[arg(long)]
        name: String,

        /// Catalog host, e.g. data.cityofnewyork.us
        #[arg(long)]
        domain: String,

        /// Page linked when a report leaves updates out
        #[arg(long)]
        link: String,

        /// Slack incoming webhook URL (reports print to stdout without one)
        #[arg(long)]
        slack_url: Option<String>,

        /// Catalog locale
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Run one sync cycle for each target
    Run {
        /// Only run the target with this name or domain
        #[arg(long)]
        target: Option<String>,

        /// Build reports without sending them or saving baselines
        #[arg(long)]
        dry_run: bool,

        /// Seed for sampling long change lists
        #[arg(long)]
        seed: Option<u64>,

        /// Hide progress bars
        #[arg(long)]
        quiet: bool,
    },

    /// Compare two exported snapshot files and print the report
    Diff {
        /// Older snapshot (JSON array of records)
        old: PathBuf,

        /// Newer snapshot (JSON array of records)
        new: PathBuf,

        /// Catalog host used for dataset links
        #[arg(long, default_value = "catalog.local")]
        domain: String,

        /// Page linked when updates are left out (defaults to the catalog root)
        #[arg(long)]
        link: Option<String>,

        /// Label of that link
        #[arg(long, default_value = "catalog")]
        label: String,

        /// Number of row count changes shown before sampling (must be > 0)
        #[arg(long, default_value = "5", value_parser = validate_max_visible)]
        max_visible: usize,

        /// Seed for sampling long change lists
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Export a target's baseline as JSON
    Export {
        /// Target name or domain
        target: String,

        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show baseline information for a target
    Show {
        /// Target name or domain
        target: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// List configured targets
    List {
        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that the visible change count is greater than 0
fn validate_max_visible(s: &str) -> Result<usize, String> {
    let max_visible: usize = s
        .parse()
        .map_err(|_| format!("Invalid count: '{}'. Must be a positive integer.", s))?;

    if max_visible == 0 {
        return Err("max-visible must be greater than 0".to_string());
    }

    Ok(max_visible)
}
