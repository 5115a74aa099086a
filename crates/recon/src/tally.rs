//! Percentage-correct tallies over boolean-like quality flags.
//!
//! Checked-submission exports carry columns such as `ScanPerfect` whose
//! cells are written by different tools: literal booleans, free text like
//! `"True"` or `"t"`, blanks for rows nobody reviewed. Each cell is
//! classified first; only booleans and text take part in the percentage.

use crate::config::TallyColumn;
use crate::missing::is_missing;
use crate::model::{CohortData, CohortTally, ColumnTally, Tally, TallyReport};

/// Classification of one flag cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
    /// Numeric or otherwise not a flag; excluded from the denominator.
    Unrecognized,
    Missing,
}

impl FlagValue {
    /// Hit = boolean `true`, or text whose first character lower-cases to `'t'`.
    pub fn is_hit(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s
                .chars()
                .next()
                .is_some_and(|c| c.to_lowercase().eq(std::iter::once('t'))),
            Self::Unrecognized | Self::Missing => false,
        }
    }

    pub fn is_counted(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Text(_))
    }
}

pub fn classify(cell: Option<&str>) -> FlagValue {
    let Some(raw) = cell else {
        return FlagValue::Missing;
    };
    if is_missing(raw) {
        return FlagValue::Missing;
    }
    if raw.eq_ignore_ascii_case("true") {
        return FlagValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return FlagValue::Bool(false);
    }
    if raw.trim().parse::<f64>().is_ok() {
        return FlagValue::Unrecognized;
    }
    FlagValue::Text(raw.to_string())
}

pub fn tally_values<'a, I>(cells: I) -> Tally
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut tally = Tally::default();
    for cell in cells {
        let value = classify(cell);
        if value.is_counted() {
            tally.counted += 1;
            if value.is_hit() {
                tally.hits += 1;
            }
        } else {
            tally.excluded += 1;
        }
    }
    tally
}

fn tally_cohort<'a, I>(name: &str, rows: usize, columns: &[TallyColumn], cells_for: I) -> CohortTally
where
    I: Fn(usize) -> Vec<Option<&'a str>>,
{
    let columns = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let tally = tally_values(cells_for(i));
            ColumnTally {
                column: col.column.clone(),
                label: col.label.clone(),
                tally,
                percent: tally.percent(),
            }
        })
        .collect();

    CohortTally {
        name: name.to_string(),
        n: rows,
        columns,
    }
}

/// Cells of the i-th column; a column never loaded has none.
fn column_cells(cohort: &CohortData, i: usize) -> &[Option<String>] {
    cohort.values.get(i).map(Vec::as_slice).unwrap_or(&[])
}

/// Tally every cohort separately, plus an `Overall` entry over all of them
/// concatenated.
pub fn tally_cohorts(cohorts: &[CohortData], columns: &[TallyColumn]) -> TallyReport {
    let per_cohort: Vec<CohortTally> = cohorts
        .iter()
        .map(|c| {
            if c.rows == 0 {
                log::warn!("cohort '{}' has no rows", c.name);
            }
            tally_cohort(&c.name, c.rows, columns, move |i| {
                column_cells(c, i).iter().map(|v| v.as_deref()).collect()
            })
        })
        .collect();

    let total_rows = cohorts.iter().map(|c| c.rows).sum();
    let overall = tally_cohort("Overall", total_rows, columns, move |i| {
        cohorts
            .iter()
            .flat_map(|c| column_cells(c, i).iter().map(|v| v.as_deref()))
            .collect()
    });

    TallyReport {
        overall,
        cohorts: per_cohort,
    }
}
