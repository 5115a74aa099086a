// Property-based tests for matriculation and file-stem matching.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use gradex_recon::matcher::{find_unmatched_by_filename, find_unmatched_by_key};
use gradex_recon::model::{InputRecord, ReferenceRecord};
use gradex_recon::stem::stem;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small key space so that collisions between the two sides are common.
fn arb_matric() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => r"[sS][0-9]{2}".prop_map(Some),
        1 => Just(None),
    ]
}

fn arb_filename() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => r"[ab]{1,2}(\.[a-z]{1,3}){0,2}".prop_map(Some),
        1 => Just(None),
    ]
}

fn arb_inputs() -> impl Strategy<Value = Vec<InputRecord>> {
    prop::collection::vec((arb_matric(), arb_filename(), arb_filename()), 0..30).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(row, (matriculation, filename, original_filename))| InputRecord {
                row,
                matriculation,
                filename,
                original_filename,
            })
            .collect()
    })
}

fn arb_references() -> impl Strategy<Value = Vec<ReferenceRecord>> {
    prop::collection::vec((arb_matric(), arb_filename()), 0..30).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(row, (matriculation, original_filename))| ReferenceRecord {
                row,
                matriculation,
                original_filename,
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Nested-scan oracle
// ---------------------------------------------------------------------------

fn naive_unmatched(inputs: &[InputRecord], refs: &[ReferenceRecord]) -> Vec<usize> {
    let mut out = Vec::new();
    for i in inputs {
        let mut found = false;
        for r in refs {
            if i.matriculation.is_some() && i.matriculation == r.matriculation {
                found = true;
            }
        }
        if !found {
            out.push(i.row);
        }
    }
    out
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn key_pass_agrees_with_nested_scan(inputs in arb_inputs(), refs in arb_references()) {
        let rows: Vec<usize> = find_unmatched_by_key(&inputs, &refs).iter().map(|r| r.row).collect();
        prop_assert_eq!(rows, naive_unmatched(&inputs, &refs));
    }

    #[test]
    fn present_keys_never_reported(inputs in arb_inputs(), refs in arb_references()) {
        let keys: HashSet<&str> = refs.iter().filter_map(|r| r.matriculation.as_deref()).collect();
        for rec in find_unmatched_by_key(&inputs, &refs) {
            if let Some(m) = rec.matriculation.as_deref() {
                prop_assert!(!keys.contains(m));
            }
        }
    }

    #[test]
    fn stem_miss_iff_no_candidate_matches(inputs in arb_inputs(), refs in arb_references()) {
        let unmatched = find_unmatched_by_key(&inputs, &refs);
        let misses = find_unmatched_by_filename(&unmatched, &refs);
        let missed_rows: HashSet<usize> = misses.iter().map(|m| m.row).collect();

        let ref_stems: HashSet<&str> = refs
            .iter()
            .filter_map(|r| r.original_filename.as_deref())
            .map(stem)
            .collect();

        for rec in &unmatched {
            let hit = [rec.filename.as_deref(), rec.original_filename.as_deref()]
                .into_iter()
                .flatten()
                .any(|name| ref_stems.contains(stem(name)));
            prop_assert_eq!(hit, !missed_rows.contains(&rec.row));
        }
    }

    #[test]
    fn stem_is_prefix_without_dot(name in r"[a-z.]{0,12}") {
        let s = stem(&name);
        prop_assert!(name.starts_with(s));
        prop_assert!(!s.contains('.'));
        if s.len() < name.len() {
            prop_assert_eq!(name.as_bytes()[s.len()], b'.');
        }
    }
}
