use proptest::prelude::*;

use super::*;

fn id(text: &str) -> Identifier {
    Identifier::parse(text).expect("identifier should parse")
}

fn toc_entry(section_id: &str, page: u32) -> TocEntry {
    TocEntry {
        identifier: id(section_id),
        title: format!("Section {section_id}"),
        page,
    }
}

fn section(section_id: &str, start_page: u32) -> SectionEntry {
    SectionEntry {
        identifier: id(section_id),
        title: format!("Section {section_id}"),
        start_page,
        content: String::new(),
        tags: Vec::new(),
        table_labels: Vec::new(),
    }
}

fn ids(values: &[&str]) -> Vec<Identifier> {
    values.iter().map(|value| id(value)).collect()
}

#[test]
fn missing_and_extra_are_sorted_set_differences() {
    let toc = vec![toc_entry("1", 1), toc_entry("2", 3), toc_entry("2.1", 4), toc_entry("10", 9)];
    let sections = vec![section("1", 1), section("2.1", 4), section("3", 6)];

    let report = reconcile(&toc, &sections, 20, &[]);

    assert_eq!(report.toc_total, 4);
    assert_eq!(report.section_total, 3);
    assert_eq!(report.missing_in_spec, ids(&["2", "10"]));
    assert_eq!(report.extra_in_spec, ids(&["3"]));
    assert!(!report.is_clean());
}

#[test]
fn toc_gap_reported_under_parent() {
    let toc = vec![toc_entry("1", 1), toc_entry("2", 2), toc_entry("2.1", 3), toc_entry("2.3", 5)];
    let sections = vec![section("1", 1), section("2", 2), section("2.1", 3), section("2.3", 5)];

    let report = reconcile(&toc, &sections, 10, &[]);

    assert_eq!(report.gaps.toc.len(), 1);
    let gap = &report.gaps.toc[0];
    assert_eq!(gap.parent_id, Some(id("2")));
    assert_eq!(gap.after, id("2.1"));
    assert_eq!(gap.before, id("2.3"));
    assert_eq!(gap.missing, ids(&["2.2"]));
    assert_eq!(gap.missing_count, 1);
    assert_eq!(report.gaps.sections, report.gaps.toc);
}

#[test]
fn gaps_ignore_level_changes_and_leading_numbers() {
    let gaps = detect_gaps(ids(&["1", "1.1", "1.1.1", "1.2", "2", "3.2", "3.3"]).iter());
    assert!(gaps.is_empty(), "unexpected gaps: {gaps:?}");

    let gaps = detect_gaps(ids(&["4", "7", "7.1", "7.4"]).iter());
    assert_eq!(gaps.len(), 2);
    assert_eq!(gaps[0].parent_id, None);
    assert_eq!(gaps[0].missing, ids(&["5", "6"]));
    assert_eq!(gaps[1].parent_id, Some(id("7")));
    assert_eq!(gaps[1].missing, ids(&["7.2", "7.3"]));
}

#[test]
fn wide_gaps_are_counted_but_listing_is_capped() {
    let gaps = detect_gaps(ids(&["1", "500"]).iter());
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].missing_count, 498);
    assert_eq!(gaps[0].missing.len(), gaps::MAX_LISTED_MISSING as usize);
    assert_eq!(gaps[0].missing[0], id("2"));
}

#[test]
fn toc_order_violation_reports_adjacent_pair() {
    let toc = vec![toc_entry("1", 1), toc_entry("3", 2), toc_entry("2", 3)];

    let report = reconcile(&toc, &[], 10, &[]);

    assert_eq!(
        report.order_mismatches,
        vec![OrderMismatch {
            previous: id("3"),
            current: id("2"),
        }]
    );
}

#[test]
fn section_order_disagreeing_with_toc_is_reported() {
    let toc = vec![toc_entry("1", 1), toc_entry("1.1", 2), toc_entry("1.2", 3), toc_entry("2", 4)];
    let sections = vec![section("1", 1), section("1.2", 3), section("1.1", 2), section("2", 4)];

    let report = reconcile(&toc, &sections, 10, &[]);

    assert!(report.order_mismatches.is_empty());
    assert_eq!(
        report.section_order_mismatches,
        vec![OrderMismatch {
            previous: id("1.1"),
            current: id("1.2"),
        }]
    );
}

#[test]
fn table_delta_prefers_listed_tables() {
    let toc = vec![toc_entry("1", 1)];
    let mut first = section("1", 1);
    first.table_labels = vec!["6-1".to_string(), "6-10".to_string()];
    let mut second = section("2", 2);
    second.table_labels = vec!["6-2".to_string(), "6-1".to_string()];

    let listed = vec!["6-1".to_string(), "6-2".to_string(), "6-3".to_string(), "6-9".to_string()];
    let report = reconcile(&toc, &[first, second], 10, &listed);
    let delta = &report.table_count_delta;

    assert_eq!(delta.toc_tables, 4);
    assert_eq!(delta.section_tables, 3);
    assert_eq!(delta.delta, -1);
    assert_eq!(delta.missing_in_sections, vec!["6-3", "6-9"]);
    assert_eq!(delta.extra_in_sections, vec!["6-10"]);
}

#[test]
fn table_delta_falls_back_to_toc_titles() {
    let mut toc = vec![toc_entry("1", 1), toc_entry("2", 2)];
    toc[1].title = "Summary of Table 2-1: Timers".to_string();
    let mut body = section("2", 2);
    body.table_labels = vec!["2-1".to_string()];

    let report = reconcile(&toc, &[body], 10, &[]);

    assert_eq!(report.table_count_delta.toc_tables, 1);
    assert_eq!(report.table_count_delta.section_tables, 1);
    assert_eq!(report.table_count_delta.delta, 0);
}

#[test]
fn page_bound_violations_cover_both_sources() {
    let toc = vec![toc_entry("1", 0), toc_entry("2", 4)];
    let sections = vec![section("2", 11), section("1", 1)];

    let report = reconcile(&toc, &sections, 10, &[]);

    assert_eq!(
        report.page_bound_violations,
        vec![
            PageBoundViolation {
                source: EntrySource::Toc,
                section_id: id("1"),
                page: 0,
            },
            PageBoundViolation {
                source: EntrySource::Section,
                section_id: id("2"),
                page: 11,
            },
        ]
    );
}

#[test]
fn matching_sets_produce_clean_report() {
    let toc = vec![toc_entry("1", 1), toc_entry("1.1", 2), toc_entry("2", 3)];
    let sections = vec![section("1", 1), section("1.1", 2), section("2", 3)];

    let report = reconcile(&toc, &sections, 3, &[]);

    assert!(report.is_clean(), "unexpected discrepancies: {report:?}");
}

#[test]
fn report_serializes_identifiers_as_dotted_strings() {
    let toc = vec![toc_entry("2.1", 1), toc_entry("2.3", 2)];
    let report = reconcile(&toc, &[], 5, &[]);

    let value = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(value["missing_in_spec"], serde_json::json!(["2.1", "2.3"]));
    assert_eq!(value["gaps"]["toc"][0]["parent_id"], serde_json::json!("2"));
    assert_eq!(value["gaps"]["toc"][0]["missing"], serde_json::json!(["2.2"]));
}

fn arb_section_id() -> impl Strategy<Value = String> {
    prop::collection::vec(1u32..6, 1..4).prop_map(|parts| {
        parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(".")
    })
}

proptest! {
    #[test]
    fn prop_missing_and_extra_partition_inputs(
        toc_ids in prop::collection::vec(arb_section_id(), 0..20),
        section_ids in prop::collection::vec(arb_section_id(), 0..20),
    ) {
        let toc = toc_ids.iter().map(|value| toc_entry(value, 1)).collect::<Vec<_>>();
        let sections = section_ids.iter().map(|value| section(value, 1)).collect::<Vec<_>>();

        let report = reconcile(&toc, &sections, 1, &[]);

        let toc_set = toc.iter().map(|entry| entry.identifier.clone()).collect::<BTreeSet<_>>();
        let section_set = sections.iter().map(|entry| entry.identifier.clone()).collect::<BTreeSet<_>>();
        let common = toc_set.intersection(&section_set).cloned().collect::<BTreeSet<_>>();

        let missing = report.missing_in_spec.iter().cloned().collect::<BTreeSet<_>>();
        let extra = report.extra_in_spec.iter().cloned().collect::<BTreeSet<_>>();

        prop_assert!(missing.is_disjoint(&common));
        prop_assert!(extra.is_disjoint(&common));
        prop_assert_eq!(missing.union(&common).cloned().collect::<BTreeSet<_>>(), toc_set);
        prop_assert_eq!(extra.union(&common).cloned().collect::<BTreeSet<_>>(), section_set);
    }

    #[test]
    fn prop_reconcile_is_idempotent(
        toc_ids in prop::collection::vec(arb_section_id(), 0..20),
        section_ids in prop::collection::vec(arb_section_id(), 0..20),
    ) {
        let toc = toc_ids.iter().map(|value| toc_entry(value, 2)).collect::<Vec<_>>();
        let sections = section_ids.iter().map(|value| section(value, 3)).collect::<Vec<_>>();

        let first = serde_json::to_vec(&reconcile(&toc, &sections, 2, &[])).expect("serialize");
        let second = serde_json::to_vec(&reconcile(&toc, &sections, 2, &[])).expect("serialize");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_set_results_ignore_input_order(
        toc_ids in prop::collection::vec(arb_section_id(), 0..20),
        section_ids in prop::collection::vec(arb_section_id(), 0..20),
    ) {
        let toc = toc_ids.iter().map(|value| toc_entry(value, 1)).collect::<Vec<_>>();
        let sections = section_ids.iter().map(|value| section(value, 1)).collect::<Vec<_>>();
        let reversed_toc = toc.iter().rev().cloned().collect::<Vec<_>>();
        let reversed_sections = sections.iter().rev().cloned().collect::<Vec<_>>();

        let forward = reconcile(&toc, &sections, 1, &[]);
        let backward = reconcile(&reversed_toc, &reversed_sections, 1, &[]);

        prop_assert_eq!(forward.missing_in_spec, backward.missing_in_spec);
        prop_assert_eq!(forward.extra_in_spec, backward.extra_in_spec);
        prop_assert_eq!(forward.gaps, backward.gaps);
    }
}
