use super::*;

pub const MAX_LISTED_MISSING: u32 = 64;

/// Sibling gaps among `ids`. Identifiers are grouped by parent and each pair
/// of consecutive present siblings is checked against `expected_successor`.
/// Numbering before the first present sibling is not a gap.
pub fn detect_gaps<'a>(ids: impl IntoIterator<Item = &'a Identifier>) -> Vec<Gap> {
    let mut siblings = BTreeMap::<Option<Identifier>, BTreeSet<&'a Identifier>>::new();
    for id in ids {
        siblings.entry(id.parent()).or_default().insert(id);
    }

    let mut gaps = Vec::new();
    for (parent_id, children) in siblings {
        let ordered = children.into_iter().collect::<Vec<&Identifier>>();
        for pair in ordered.windows(2) {
            let (after, before) = (pair[0], pair[1]);
            let expected = after.expected_successor();
            if &expected == before {
                continue;
            }

            let missing_count = before.last() - expected.last();
            let listed_end = expected
                .last()
                .saturating_add(missing_count.min(MAX_LISTED_MISSING));
            let missing = (expected.last()..listed_end)
                .map(|last| after.with_last(last))
                .collect();

            gaps.push(Gap {
                parent_id: parent_id.clone(),
                after: after.clone(),
                before: before.clone(),
                missing_count,
                missing,
            });
        }
    }

    gaps
}
