//! # scout
//!
//! Watches open-data catalogs, diffs each fetched snapshot against the last
//! reported baseline, and posts a summary of added, removed, and resized
//! datasets to Slack.

pub mod cli;
pub mod error;
pub mod config;
pub mod workspace;
pub mod snapshot;
pub mod change_detection;
pub mod notes;
pub mod report;
pub mod sync;
pub mod hash;
pub mod archive;
pub mod store;
pub mod fetch;
pub mod notify;
pub mod progress;
pub mod output;
pub mod commands;

pub use error::{Result, ScoutError};
pub use snapshot::{DatasetRecord, Snapshot};
pub use workspace::ScoutWorkspace;

/// Current format version for scout files
pub const FORMAT_VERSION: &str = "1.0.0";

/// Row count changes shown before the rest are sampled
pub const DEFAULT_MAX_VISIBLE: usize = 5;

/// Descriptions longer than this are cut in reports
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 160;

/// Catalog listing page size
pub const DEFAULT_PAGE_SIZE: usize = 100;
