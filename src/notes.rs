//! Formatting of diff results into chat-ready note fragments

use crate::change_detection::CellDelta;
use crate::snapshot::DatasetRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Marker appended to descriptions that were cut short
const TRUNCATION_MARKER: &str = "..";

/// Descriptions this short or shorter are left out of the note
const MIN_DESCRIPTION_CHARS: usize = 2;

/// One line of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFragment {
    pub text: String,
    /// Dataset name the fragment sorts by; empty for summary lines
    pub sort_key: String,
}

impl NoteFragment {
    pub fn new(text: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// Wording and icons used by the notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteStyle {
    pub added_intro: String,
    pub removed_intro: String,
    pub add_icon: String,
    pub sub_icon: String,
}

impl Default for NoteStyle {
    fn default() -> Self {
        Self {
            added_intro: "New dataset added:".to_string(),
            removed_intro: "Dataset removed:".to_string(),
            add_icon: "*+* ".to_string(),
            sub_icon: "*-* ".to_string(),
        }
    }
}

/// Link shown when part of a change list was left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreInfoLink {
    pub url: String,
    pub label: String,
}

impl MoreInfoLink {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

/// Slack-style `<url|label>` link to a dataset
pub fn link_label(dataset_base_url: &str, id: &str, name: &str) -> String {
    format!("<{}/{}|{}>", dataset_base_url, id, name)
}

/// Cut `description` to `limit` characters, marking it only if something was cut
pub fn truncate_description(description: &str, limit: usize) -> String {
    match description.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &description[..cut], TRUNCATION_MARKER),
        None => description.to_string(),
    }
}

fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

/// One fragment per added or removed dataset, in input order
pub fn format_row_add_remove(
    records: &[DatasetRecord],
    intro: &str,
    dataset_base_url: &str,
    description_limit: usize,
) -> Vec<NoteFragment> {
    records
        .iter()
        .map(|record| {
            let mut text = format!(
                "{} {}",
                intro,
                link_label(dataset_base_url, &record.id, &record.name)
            );

            let description = truncate_description(&record.description, description_limit);
            if description.chars().count() > MIN_DESCRIPTION_CHARS {
                text.push_str(&format!(" _{}_", description));
            }

            NoteFragment::new(text, record.name.clone())
        })
        .collect()
}

/// One fragment per row count change, sorted by dataset name
pub fn format_cell_deltas(
    deltas: &[CellDelta],
    add_icon: &str,
    sub_icon: &str,
    dataset_base_url: &str,
) -> Vec<NoteFragment> {
    let mut fragments: Vec<NoteFragment> = deltas
        .iter()
        .map(|delta| {
            let link = link_label(dataset_base_url, &delta.id, &delta.name);
            let (icon, verb) = if delta.row_count_delta > 0 {
                (add_icon, "added")
            } else {
                (sub_icon, "deleted")
            };
            let count = delta.row_count_delta.unsigned_abs();

            NoteFragment::new(
                format!("{}{} {} {} {}", icon, link, verb, count, plural(count, "row", "rows")),
                delta.name.clone(),
            )
        })
        .collect();

    fragments.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    fragments
}

/// Keep a random, order-preserving sample of `max_visible` fragments and
/// disclose how many were left out.
pub fn truncate_for_display<R: Rng + ?Sized>(
    fragments: Vec<NoteFragment>,
    max_visible: usize,
    more_info: &MoreInfoLink,
    rng: &mut R,
) -> Vec<NoteFragment> {
    if fragments.len() <= max_visible {
        return fragments;
    }

    let trimmed = fragments.len() - max_visible;
    let mut keep = rand::seq::index::sample(rng, fragments.len(), max_visible).into_vec();
    keep.sort_unstable();

    let mut slots: Vec<Option<NoteFragment>> = fragments.into_iter().map(Some).collect();
    let mut sampled: Vec<NoteFragment> = keep
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();

    sampled.push(NoteFragment::new(
        format!(
            "..and {} additional <{}|{} {}>",
            trimmed,
            more_info.url,
            more_info.label,
            plural(trimmed as u64, "update", "updates")
        ),
        String::new(),
    ));

    sampled
}

/// Join fragments into one note section; empty input gives an empty string
pub fn join_fragments(fragments: &[NoteFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
