//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for catalog fetches
#[derive(Debug)]
pub struct ProgressReporter {
    pub catalog_pb: Option<ProgressBar>,
    pub metadata_pb: Option<ProgressBar>,
    label: String,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for fetching one catalog
    pub fn new_for_fetch(label: &str) -> Self {
        let catalog_pb = create_spinner(&format!("{}: listing catalog...", label));

        Self {
            catalog_pb: Some(catalog_pb),
            metadata_pb: None,
            label: label.to_string(),
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            catalog_pb: None,
            metadata_pb: None,
            label: String::new(),
            show_progress: false,
        }
    }

    /// Update the catalog spinner with ids listed so far
    pub fn update_catalog(&mut self, listed: usize, total: usize) {
        if let Some(pb) = &self.catalog_pb {
            pb.set_message(format!("{}: listed {}/{} datasets", self.label, listed, total));
        }
    }

    /// Finish catalog listing
    pub fn finish_catalog(&mut self, message: &str) {
        if let Some(pb) = self.catalog_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Lazily create the metadata progress bar
    pub fn start_metadata(&mut self, total: u64) {
        if self.show_progress && self.metadata_pb.is_none() {
            self.metadata_pb = Some(create_progress_bar(total, &format!("{}: fetching metadata", self.label)));
        }
    }

    /// Update metadata progress
    pub fn update_metadata(&mut self, processed: u64) {
        if let Some(pb) = &self.metadata_pb {
            pb.set_position(processed);
        }
    }

    /// Finish metadata fetching
    pub fn finish_metadata(&mut self, message: &str) {
        if let Some(pb) = self.metadata_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Bars left over from a failed fetch are cleared silently
        if let Some(pb) = self.catalog_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.metadata_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {eta} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
