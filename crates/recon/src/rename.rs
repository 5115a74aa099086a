use std::collections::HashSet;

use crate::model::{RenameEntry, RenameMiss, RenameReport};

/// Length of the submission prefix the drop box prepends to every upload,
/// e.g. `Practice Exam Drop Box_s2032738_attempt_2020-04-22-04-19-43_`.
pub const DEFAULT_TRIM_CHARS: usize = 60;

/// `before` with its first `trim_chars` characters removed.
pub fn expected_name(before: &str, trim_chars: usize) -> &str {
    match before.char_indices().nth(trim_chars) {
        Some((i, _)) => &before[i..],
        None => "",
    }
}

/// Check that every renamed file in the log turns up in the `After` column.
///
/// Missing `Before` cells are skipped; both counts ignore missing cells.
pub fn check_renames(entries: &[RenameEntry], trim_chars: usize) -> RenameReport {
    let afters: HashSet<&str> = entries.iter().filter_map(|e| e.after.as_deref()).collect();

    let mut before_count = 0;
    let mut misses = Vec::new();
    for entry in entries {
        let Some(before) = entry.before.as_deref() else {
            continue;
        };
        before_count += 1;
        let expected = expected_name(before, trim_chars);
        if !afters.contains(expected) {
            misses.push(RenameMiss {
                row: entry.row,
                before: before.to_string(),
                expected: expected.to_string(),
            });
        }
    }

    let after_count = entries.iter().filter(|e| e.after.is_some()).count();
    log::debug!("rename log: {before_count} before, {after_count} after, {} misses", misses.len());

    RenameReport {
        trim_chars,
        before_count,
        after_count,
        misses,
    }
}
