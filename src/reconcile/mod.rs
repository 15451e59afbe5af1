//! Comparison of TOC entries against body sections.
//!
//! [`reconcile`] is pure and deterministic. Set-valued results (missing, extra,
//! gaps, table labels) are sorted by identifier or label and do not depend on
//! input order; the two order checks read the TOC and section sequences as
//! given, since document order is what they test.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::extract::{SectionEntry, TocEntry};
use crate::identifier::Identifier;

mod gaps;
#[cfg(test)]
mod tests;

pub use gaps::detect_gaps;

/// Adjacent pair whose identifier order contradicts document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMismatch {
    pub previous: Identifier,
    pub current: Identifier,
}

/// A hole between two present siblings, e.g. `2.1` and `2.3` around `2.2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub parent_id: Option<Identifier>,
    pub after: Identifier,
    pub before: Identifier,
    pub missing_count: u32,
    /// At most [`gaps::MAX_LISTED_MISSING`] identifiers; `missing_count` is exact.
    pub missing: Vec<Identifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    pub toc: Vec<Gap>,
    pub sections: Vec<Gap>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCountDelta {
    pub toc_tables: usize,
    pub section_tables: usize,
    /// `section_tables - toc_tables`.
    pub delta: i64,
    pub missing_in_sections: Vec<String>,
    pub extra_in_sections: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Toc,
    Section,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBoundViolation {
    pub source: EntrySource,
    pub section_id: Identifier,
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyReport {
    pub toc_total: usize,
    pub section_total: usize,
    pub missing_in_spec: Vec<Identifier>,
    pub extra_in_spec: Vec<Identifier>,
    pub order_mismatches: Vec<OrderMismatch>,
    pub section_order_mismatches: Vec<OrderMismatch>,
    pub gaps: GapReport,
    pub table_count_delta: TableCountDelta,
    pub page_bound_violations: Vec<PageBoundViolation>,
}

impl DiscrepancyReport {
    pub fn is_clean(&self) -> bool {
        self.missing_in_spec.is_empty()
            && self.extra_in_spec.is_empty()
            && self.order_mismatches.is_empty()
            && self.section_order_mismatches.is_empty()
            && self.gaps.toc.is_empty()
            && self.gaps.sections.is_empty()
            && self.page_bound_violations.is_empty()
    }
}

/// `listed_tables` are front-matter "List of Tables" labels. When empty, the
/// TOC side falls back to `Table N-M` labels mentioned in TOC titles.
pub fn reconcile(
    toc: &[TocEntry],
    sections: &[SectionEntry],
    total_pages: u32,
    listed_tables: &[String],
) -> DiscrepancyReport {
    let toc_ids = toc
        .iter()
        .map(|entry| &entry.identifier)
        .collect::<BTreeSet<&Identifier>>();
    let section_ids = sections
        .iter()
        .map(|section| &section.identifier)
        .collect::<BTreeSet<&Identifier>>();

    let missing_in_spec = toc_ids
        .difference(&section_ids)
        .map(|id| (*id).clone())
        .collect();
    let extra_in_spec = section_ids
        .difference(&toc_ids)
        .map(|id| (*id).clone())
        .collect();

    DiscrepancyReport {
        toc_total: toc.len(),
        section_total: sections.len(),
        missing_in_spec,
        extra_in_spec,
        order_mismatches: toc_order_mismatches(toc),
        section_order_mismatches: section_order_mismatches(toc, sections),
        gaps: GapReport {
            toc: detect_gaps(toc_ids.iter().copied()),
            sections: detect_gaps(section_ids.iter().copied()),
        },
        table_count_delta: table_count_delta(toc, sections, listed_tables),
        page_bound_violations: page_bound_violations(toc, sections, total_pages),
    }
}

fn toc_order_mismatches(toc: &[TocEntry]) -> Vec<OrderMismatch> {
    toc.windows(2)
        .filter(|pair| pair[0].identifier > pair[1].identifier)
        .map(|pair| OrderMismatch {
            previous: pair[0].identifier.clone(),
            current: pair[1].identifier.clone(),
        })
        .collect()
}

/// Walks the identifiers both sides share in TOC order and reports each one
/// that appears earlier in the section sequence than its TOC predecessor.
fn section_order_mismatches(toc: &[TocEntry], sections: &[SectionEntry]) -> Vec<OrderMismatch> {
    let mut section_position = HashMap::<&Identifier, usize>::new();
    for (index, section) in sections.iter().enumerate() {
        section_position.entry(&section.identifier).or_insert(index);
    }

    let mut mismatches = Vec::new();
    let mut previous: Option<(&Identifier, usize)> = None;
    for entry in toc {
        let Some(&position) = section_position.get(&entry.identifier) else {
            continue;
        };
        if let Some((previous_id, previous_position)) = previous {
            if position < previous_position {
                mismatches.push(OrderMismatch {
                    previous: previous_id.clone(),
                    current: entry.identifier.clone(),
                });
            }
        }
        previous = Some((&entry.identifier, position));
    }

    mismatches
}

fn table_count_delta(
    toc: &[TocEntry],
    sections: &[SectionEntry],
    listed_tables: &[String],
) -> TableCountDelta {
    let toc_tables = if listed_tables.is_empty() {
        toc.iter()
            .flat_map(|entry| table_labels_in_title(&entry.title))
            .collect::<BTreeSet<String>>()
    } else {
        listed_tables.iter().cloned().collect::<BTreeSet<String>>()
    };
    let section_tables = sections
        .iter()
        .flat_map(|section| section.table_labels.iter().cloned())
        .collect::<BTreeSet<String>>();

    TableCountDelta {
        toc_tables: toc_tables.len(),
        section_tables: section_tables.len(),
        delta: section_tables.len() as i64 - toc_tables.len() as i64,
        missing_in_sections: sort_labels(toc_tables.difference(&section_tables)),
        extra_in_sections: sort_labels(section_tables.difference(&toc_tables)),
    }
}

/// Labels following the word `Table` in a title, e.g. `6-1` in
/// "Table 6-1 Message Header".
fn table_labels_in_title(title: &str) -> Vec<String> {
    let words = title.split_whitespace().collect::<Vec<&str>>();
    words
        .windows(2)
        .filter(|pair| pair[0].eq_ignore_ascii_case("table"))
        .map(|pair| pair[1].trim_end_matches([':', '.', ',']))
        .filter(|label| {
            label.starts_with(|ch: char| ch.is_ascii_digit())
                && label.chars().all(|ch| ch.is_ascii_digit() || ch == '-' || ch == '.')
        })
        .map(ToOwned::to_owned)
        .collect()
}

/// Numeric-aware label order so `6-10` follows `6-9`.
fn sort_labels<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut keyed = labels
        .map(|label| {
            let key = label
                .split(['-', '.'])
                .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
                .collect::<Vec<u64>>();
            (key, label.clone())
        })
        .collect::<Vec<(Vec<u64>, String)>>();
    keyed.sort();
    keyed.into_iter().map(|(_, label)| label).collect()
}

fn page_bound_violations(
    toc: &[TocEntry],
    sections: &[SectionEntry],
    total_pages: u32,
) -> Vec<PageBoundViolation> {
    let out_of_range = |page: u32| page < 1 || page > total_pages;

    let mut violations = toc
        .iter()
        .filter(|entry| out_of_range(entry.page))
        .map(|entry| PageBoundViolation {
            source: EntrySource::Toc,
            section_id: entry.identifier.clone(),
            page: entry.page,
        })
        .chain(
            sections
                .iter()
                .filter(|section| out_of_range(section.start_page))
                .map(|section| PageBoundViolation {
                    source: EntrySource::Section,
                    section_id: section.identifier.clone(),
                    page: section.start_page,
                }),
        )
        .collect::<Vec<PageBoundViolation>>();

    violations.sort_by(|a, b| {
        a.source
            .cmp(&b.source)
            .then_with(|| a.section_id.cmp(&b.section_id))
            .then(a.page.cmp(&b.page))
    });
    violations
}
