//! Functional tests for note formatting and display truncation

use crate::common::sample_data::{record, BASE_URL};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scout::change_detection::CellDelta;
use scout::notes::{
    format_cell_deltas, format_row_add_remove, join_fragments, truncate_description, truncate_for_display,
    MoreInfoLink, NoteFragment,
};

const LIMIT: usize = 160;

fn more_info() -> MoreInfoLink {
    MoreInfoLink::new("https://data.example.org/browse", "Example Data")
}

fn delta(id: &str, name: &str, rows: i64) -> CellDelta {
    CellDelta {
        id: id.to_string(),
        name: name.to_string(),
        row_count_delta: rows,
    }
}

fn numbered_fragments(count: usize) -> Vec<NoteFragment> {
    (0..count)
        .map(|i| NoteFragment::new(format!("line {:02}", i), format!("{:02}", i)))
        .collect()
}

#[test]
fn test_description_at_limit_is_not_marked() {
    let description = "d".repeat(160);
    assert_eq!(truncate_description(&description, LIMIT), description);
}

#[test]
fn test_description_over_limit_is_cut_and_marked() {
    let description = "d".repeat(161);
    let truncated = truncate_description(&description, LIMIT);
    assert_eq!(truncated, format!("{}..", "d".repeat(160)));
    assert_eq!(truncated.chars().count(), 162);
}

#[test]
fn test_row_fragment_with_description() {
    let records = vec![record("tree-cens", "Street Trees", 1).with_description("Every street tree")];
    let fragments = format_row_add_remove(&records, "New dataset added:", BASE_URL, LIMIT);

    assert_eq!(fragments.len(), 1);
    assert_eq!(
        fragments[0].text,
        "New dataset added: <https://data.example.org/resource/tree-cens|Street Trees> _Every street tree_"
    );
}

#[test]
fn test_short_descriptions_are_omitted() {
    let records = vec![
        record("a", "Two", 1).with_description("ab"),
        record("b", "Three", 1).with_description("abc"),
        record("c", "None", 1),
    ];
    let fragments = format_row_add_remove(&records, "Dataset removed:", BASE_URL, LIMIT);

    assert_eq!(fragments[0].text, "Dataset removed: <https://data.example.org/resource/a|Two>");
    assert_eq!(fragments[1].text, "Dataset removed: <https://data.example.org/resource/b|Three> _abc_");
    assert_eq!(fragments[2].text, "Dataset removed: <https://data.example.org/resource/c|None>");
}

#[test]
fn test_row_fragments_keep_input_order() {
    let records = vec![record("z", "Zebra", 1), record("a", "Aardvark", 1)];
    let fragments = format_row_add_remove(&records, "New dataset added:", BASE_URL, LIMIT);

    let keys: Vec<&str> = fragments.iter().map(|f| f.sort_key.as_str()).collect();
    assert_eq!(keys, vec!["Zebra", "Aardvark"]);
}

#[test]
fn test_cell_delta_pluralization() {
    let deltas = vec![delta("a", "A", 1), delta("b", "B", -1), delta("c", "C", 2), delta("d", "D", -40)];
    let fragments = format_cell_deltas(&deltas, "*+* ", "*-* ", BASE_URL);

    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "*+* <https://data.example.org/resource/a|A> added 1 row",
            "*-* <https://data.example.org/resource/b|B> deleted 1 row",
            "*+* <https://data.example.org/resource/c|C> added 2 rows",
            "*-* <https://data.example.org/resource/d|D> deleted 40 rows",
        ]
    );
}

#[test]
fn test_cell_deltas_sorted_by_name_case_sensitive() {
    let deltas = vec![delta("1", "bravo", 1), delta("2", "Charlie", 1), delta("3", "alpha", 1)];
    let fragments = format_cell_deltas(&deltas, "+", "-", BASE_URL);

    let names: Vec<&str> = fragments.iter().map(|f| f.sort_key.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "alpha", "bravo"]);
}

#[test]
fn test_truncation_leaves_short_lists_alone() {
    let fragments = numbered_fragments(5);
    let result = truncate_for_display(fragments.clone(), 5, &more_info(), &mut StdRng::seed_from_u64(3));
    assert_eq!(result, fragments);
}

#[test]
fn test_truncation_discloses_single_trimmed_update() {
    let result = truncate_for_display(numbered_fragments(6), 5, &more_info(), &mut StdRng::seed_from_u64(3));

    assert_eq!(result.len(), 6);
    assert_eq!(
        result[5].text,
        "..and 1 additional <https://data.example.org/browse|Example Data update>"
    );
}

#[test]
fn test_truncation_discloses_many_trimmed_updates() {
    let result = truncate_for_display(numbered_fragments(12), 5, &more_info(), &mut StdRng::seed_from_u64(3));

    assert_eq!(result.len(), 6);
    assert_eq!(
        result[5].text,
        "..and 7 additional <https://data.example.org/browse|Example Data updates>"
    );
}

#[test]
fn test_truncation_sample_keeps_original_order() {
    let original = numbered_fragments(40);

    for seed in 0..20 {
        let result = truncate_for_display(original.clone(), 5, &more_info(), &mut StdRng::seed_from_u64(seed));
        let sampled = &result[..5];

        let positions: Vec<usize> = sampled
            .iter()
            .map(|f| original.iter().position(|o| o == f).expect("sampled fragment comes from input"))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(positions, sorted, "seed {} broke ordering", seed);
    }
}

#[test]
fn test_truncation_is_reproducible_with_seed() {
    let first = truncate_for_display(numbered_fragments(30), 5, &more_info(), &mut StdRng::seed_from_u64(99));
    let second = truncate_for_display(numbered_fragments(30), 5, &more_info(), &mut StdRng::seed_from_u64(99));
    assert_eq!(first, second);
}

#[test]
fn test_join_fragments() {
    assert_eq!(join_fragments(&[]), "");
    let fragments = vec![NoteFragment::new("one", "a"), NoteFragment::new("two", "b")];
    assert_eq!(join_fragments(&fragments), "one\ntwo");
}
