//! Assembly of the outbound change report

use crate::change_detection::{ChangeDetector, ChangeSummary};
use crate::notes::{self, MoreInfoLink, NoteStyle};
use crate::snapshot::Snapshot;
use rand::Rng;
use serde::Serialize;

/// Static settings for building a report for one target
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Prefix of dataset links, e.g. `https://data.example.org/resource`
    pub dataset_base_url: String,
    pub more_info: MoreInfoLink,
    pub max_visible: usize,
    pub description_limit: usize,
    pub style: NoteStyle,
}

impl ReportConfig {
    pub fn new(dataset_base_url: impl Into<String>, more_info: MoreInfoLink) -> Self {
        Self {
            dataset_base_url: dataset_base_url.into(),
            more_info,
            max_visible: crate::DEFAULT_MAX_VISIBLE,
            description_limit: crate::DEFAULT_DESCRIPTION_LIMIT,
            style: NoteStyle::default(),
        }
    }
}

/// Text produced by one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    /// Full multi-section message for the chat channel
    pub primary_text: String,
    /// New-dataset announcements only
    pub headline_text: String,
    pub summary: ChangeSummary,
}

impl ChangeReport {
    /// An empty primary text means there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.primary_text.is_empty()
    }
}

/// Diff `old` against `new` and render the result
pub fn assemble_report<R: Rng + ?Sized>(
    old: &Snapshot,
    new: &Snapshot,
    config: &ReportConfig,
    rng: &mut R,
) -> ChangeReport {
    let row_diff = ChangeDetector::diff_rows(old, new);
    let cell_deltas = ChangeDetector::diff_cells(old, new, &row_diff.common_ids);
    let summary = ChangeSummary::new(&row_diff, &cell_deltas);

    let added = notes::format_row_add_remove(
        &row_diff.added,
        &config.style.added_intro,
        &config.dataset_base_url,
        config.description_limit,
    );
    let removed = notes::format_row_add_remove(
        &row_diff.removed,
        &config.style.removed_intro,
        &config.dataset_base_url,
        config.description_limit,
    );
    let modified = notes::truncate_for_display(
        notes::format_cell_deltas(
            &cell_deltas,
            &config.style.add_icon,
            &config.style.sub_icon,
            &config.dataset_base_url,
        ),
        config.max_visible,
        &config.more_info,
        rng,
    );

    let added_text = notes::join_fragments(&added);
    let sections: Vec<String> = [
        added_text.clone(),
        notes::join_fragments(&removed),
        notes::join_fragments(&modified),
    ]
    .into_iter()
    .filter(|section| !section.is_empty())
    .collect();

    ChangeReport {
        primary_text: sections.join("\n\n"),
        headline_text: added_text,
        summary,
    }
}
