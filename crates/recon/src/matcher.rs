use std::collections::HashSet;

use crate::model::{
    FilenameMiss, FilenameRecovery, InputRecord, MatricReport, MatricSummary, ReferenceRecord,
};
use crate::stem::{stem, stem_of};

/// Input records whose matriculation appears in no reference record,
/// in input order.
///
/// Equality is literal: no trimming, no case folding. A missing
/// matriculation matches nothing, on either side.
pub fn find_unmatched_by_key<'a>(
    inputs: &'a [InputRecord],
    references: &[ReferenceRecord],
) -> Vec<&'a InputRecord> {
    let keys: HashSet<&str> = references
        .iter()
        .filter_map(|r| r.matriculation.as_deref())
        .collect();
    log::debug!("{} distinct reference matriculations", keys.len());

    inputs
        .iter()
        .filter(|rec| match rec.matriculation.as_deref() {
            Some(m) => !keys.contains(m),
            None => true,
        })
        .collect()
}

/// Diagnostics for records that also fail the file-stem fallback.
///
/// A record is found if the stem of its `Filename` or of its
/// `OriginalFilename` equals the stem of any reference `OriginalFilename`.
pub fn find_unmatched_by_filename(
    unmatched: &[&InputRecord],
    references: &[ReferenceRecord],
) -> Vec<FilenameMiss> {
    let stems = reference_stems(references);
    unmatched
        .iter()
        .filter_map(|rec| match match_stem(rec, &stems) {
            StemMatch::Found(_) => None,
            StemMatch::Missing(miss) => Some(miss),
        })
        .collect()
}

/// Run the key pass, then the stem fallback over whatever is left.
pub fn reconcile(inputs: &[InputRecord], references: &[ReferenceRecord]) -> MatricReport {
    let unmatched = find_unmatched_by_key(inputs, references);
    let stems = reference_stems(references);

    let mut recovered = Vec::new();
    let mut misses = Vec::new();
    for rec in &unmatched {
        match match_stem(rec, &stems) {
            StemMatch::Found(r) => recovered.push(r),
            StemMatch::Missing(m) => misses.push(m),
        }
    }

    MatricReport {
        summary: MatricSummary {
            inputs: inputs.len(),
            references: references.len(),
            matched_by_key: inputs.len() - unmatched.len(),
            recovered_by_stem: recovered.len(),
            unmatched: misses.len(),
        },
        recovered,
        misses,
    }
}

fn reference_stems(references: &[ReferenceRecord]) -> HashSet<&str> {
    references
        .iter()
        .filter_map(|r| r.original_filename.as_deref())
        .map(stem)
        .collect()
}

enum StemMatch {
    Found(FilenameRecovery),
    Missing(FilenameMiss),
}

fn match_stem(rec: &InputRecord, stems: &HashSet<&str>) -> StemMatch {
    let filename_stem = stem_of(rec.filename.as_deref());
    let original_stem = stem_of(rec.original_filename.as_deref());

    if filename_stem.is_none() && original_stem.is_none() {
        log::warn!(
            "row {}: no Filename or OriginalFilename to fall back on",
            rec.row
        );
    }

    let hit = [filename_stem, original_stem]
        .into_iter()
        .flatten()
        .find(|s| stems.contains(s));

    match hit {
        Some(s) => StemMatch::Found(FilenameRecovery {
            row: rec.row,
            matriculation: rec.matriculation.clone(),
            stem: s.to_string(),
        }),
        None => StemMatch::Missing(FilenameMiss {
            row: rec.row,
            matriculation: rec.matriculation.clone(),
            original_stem: original_stem.map(str::to_string),
            filename_stem: filename_stem.map(str::to_string),
        }),
    }
}
