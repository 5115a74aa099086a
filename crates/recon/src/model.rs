use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the ingest report. `row` is the 0-based data-row position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub row: usize,
    pub matriculation: Option<String>,
    pub filename: Option<String>,
    pub original_filename: Option<String>,
}

/// One row of the checked (reference) spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub row: usize,
    pub matriculation: Option<String>,
    pub original_filename: Option<String>,
}

/// One line of a before/after renaming log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub row: usize,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Flag cells of one cohort, column-major: `values[i]` holds every cell of
/// the i-th tallied column, one entry per row.
#[derive(Debug, Clone, Default)]
pub struct CohortData {
    pub name: String,
    pub rows: usize,
    pub values: Vec<Vec<Option<String>>>,
}

impl CohortData {
    pub fn new(name: impl Into<String>, columns: usize) -> Self {
        Self {
            name: name.into(),
            rows: 0,
            values: vec![Vec::new(); columns],
        }
    }
}

/// Pre-loaded datasets, one slot per check.
#[derive(Debug, Default)]
pub struct GradexInput {
    pub matric: Option<MatricInput>,
    pub rename: Option<Vec<RenameEntry>>,
    pub cohorts: Option<Vec<CohortData>>,
}

#[derive(Debug, Default)]
pub struct MatricInput {
    pub inputs: Vec<InputRecord>,
    pub references: Vec<ReferenceRecord>,
}

// ---------------------------------------------------------------------------
// Matriculation check
// ---------------------------------------------------------------------------

/// An input row that matched neither by matriculation nor by file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameMiss {
    pub row: usize,
    pub matriculation: Option<String>,
    pub original_stem: Option<String>,
    pub filename_stem: Option<String>,
}

/// An input row with no matriculation match that was found by file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameRecovery {
    pub row: usize,
    pub matriculation: Option<String>,
    pub stem: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatricSummary {
    pub inputs: usize,
    pub references: usize,
    pub matched_by_key: usize,
    pub recovered_by_stem: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatricReport {
    pub summary: MatricSummary,
    pub recovered: Vec<FilenameRecovery>,
    pub misses: Vec<FilenameMiss>,
}

// ---------------------------------------------------------------------------
// Rename check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameMiss {
    pub row: usize,
    pub before: String,
    pub expected: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    pub trim_chars: usize,
    pub before_count: usize,
    pub after_count: usize,
    pub misses: Vec<RenameMiss>,
}

// ---------------------------------------------------------------------------
// Quality tally
// ---------------------------------------------------------------------------

/// Counts for one flag column. Cells that are missing or of an
/// unrecognized type land in `excluded` and never reach the denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub hits: usize,
    pub counted: usize,
    pub excluded: usize,
}

impl Tally {
    /// Percentage of counted cells that are hits, rounded to the nearest
    /// integer. `None` when nothing was counted.
    pub fn percent(&self) -> Option<u32> {
        if self.counted == 0 {
            return None;
        }
        let pct = self.hits as f64 * 100.0 / self.counted as f64;
        Some(pct.round() as u32)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnTally {
    pub column: String,
    pub label: String,
    #[serde(flatten)]
    pub tally: Tally,
    pub percent: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortTally {
    pub name: String,
    pub n: usize,
    pub columns: Vec<ColumnTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TallyReport {
    pub overall: CohortTally,
    pub cohorts: Vec<CohortTally>,
}

// ---------------------------------------------------------------------------
// Combined output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

impl ReportMeta {
    pub fn new(config_name: impl Into<String>) -> Self {
        Self {
            config_name: config_name.into(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradexReport {
    pub meta: ReportMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matric: Option<MatricReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<TallyReport>,
}

impl GradexReport {
    /// Number of unresolved misses across the matriculation and rename checks.
    pub fn miss_count(&self) -> usize {
        self.matric.as_ref().map_or(0, |m| m.misses.len())
            + self.rename.as_ref().map_or(0, |r| r.misses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_nearest() {
        let t = Tally { hits: 6, counted: 9, excluded: 1 };
        assert_eq!(t.percent(), Some(67));
        let t = Tally { hits: 6, counted: 10, excluded: 0 };
        assert_eq!(t.percent(), Some(60));
        let t = Tally { hits: 1, counted: 3, excluded: 0 };
        assert_eq!(t.percent(), Some(33));
    }

    #[test]
    fn percent_of_nothing_is_none() {
        let t = Tally { hits: 0, counted: 0, excluded: 4 };
        assert_eq!(t.percent(), None);
    }

    #[test]
    fn miss_count_sums_checks() {
        let report = GradexReport {
            meta: ReportMeta::new("t"),
            matric: Some(MatricReport {
                summary: MatricSummary::default(),
                recovered: vec![],
                misses: vec![FilenameMiss {
                    row: 0,
                    matriculation: None,
                    original_stem: None,
                    filename_stem: None,
                }],
            }),
            rename: Some(RenameReport {
                trim_chars: 0,
                before_count: 2,
                after_count: 2,
                misses: vec![
                    RenameMiss { row: 0, before: "a".into(), expected: "a".into() },
                    RenameMiss { row: 1, before: "b".into(), expected: "b".into() },
                ],
            }),
            tally: None,
        };
        assert_eq!(report.miss_count(), 3);
    }
}
