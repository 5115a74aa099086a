use crate::config::{GradexConfig, TallyColumn};
use crate::error::GradexError;
use crate::matcher::reconcile;
use crate::missing::present;
use crate::model::{
    CohortData, GradexInput, GradexReport, InputRecord, ReferenceRecord, RenameEntry, ReportMeta,
};
use crate::rename::check_renames;
use crate::tally::tally_cohorts;

/// Run every check the config enables against pre-loaded data.
pub fn run(config: &GradexConfig, input: &GradexInput) -> Result<GradexReport, GradexError> {
    let matric = match (&config.matric, &input.matric) {
        (Some(_), Some(data)) => Some(reconcile(&data.inputs, &data.references)),
        (Some(_), None) => return Err(no_data("matric")),
        (None, _) => None,
    };

    let rename = match (&config.rename, &input.rename) {
        (Some(rc), Some(entries)) => Some(check_renames(entries, rc.trim_chars)),
        (Some(_), None) => return Err(no_data("rename")),
        (None, _) => None,
    };

    let tally = match (&config.tally, &input.cohorts) {
        (Some(tc), Some(cohorts)) => {
            check_cohort_shape(cohorts, &tc.columns)?;
            Some(tally_cohorts(cohorts, &tc.columns))
        }
        (Some(_), None) => return Err(no_data("tally")),
        (None, _) => None,
    };

    Ok(GradexReport {
        meta: ReportMeta::new(config.name.clone()),
        matric,
        rename,
        tally,
    })
}

/// Every tallied column must hold one cell per cohort row. A column with
/// no cell vector at all counts as empty, which only fits a cohort of
/// zero rows.
fn check_cohort_shape(cohorts: &[CohortData], columns: &[TallyColumn]) -> Result<(), GradexError> {
    for cohort in cohorts {
        for (i, col) in columns.iter().enumerate() {
            let cells = cohort.values.get(i).map_or(0, Vec::len);
            if cells != cohort.rows {
                return Err(GradexError::ConfigValidation(format!(
                    "cohort '{}': column '{}' has {cells} cell(s) for {} row(s)",
                    cohort.name, col.column, cohort.rows
                )));
            }
        }
    }
    Ok(())
}

fn no_data(section: &str) -> GradexError {
    GradexError::ConfigValidation(format!("[{section}] is configured but no data was loaded"))
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// A CSV export with its header row split off.
struct Table {
    dataset: String,
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl Table {
    fn parse(dataset: &str, csv_data: &str) -> Result<Self, GradexError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| GradexError::csv(dataset, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GradexError::csv(dataset, e))?;

        log::debug!("{dataset}: {} columns, {} rows", headers.len(), records.len());

        Ok(Self {
            dataset: dataset.to_string(),
            headers,
            records,
        })
    }

    fn column(&self, name: &str) -> Result<usize, GradexError> {
        self.headers.iter().position(|h| h == name).ok_or_else(|| {
            GradexError::MissingColumn {
                dataset: self.dataset.clone(),
                column: name.into(),
            }
        })
    }
}

/// Absent cells and NA tokens are both missing values.
fn cell(record: &csv::StringRecord, idx: usize) -> Option<String> {
    present(record.get(idx))
}

/// Load ingest-report rows. Rows are numbered from `first_row` so that
/// several exports can be concatenated.
pub fn load_input_records(
    dataset: &str,
    csv_data: &str,
    first_row: usize,
) -> Result<Vec<InputRecord>, GradexError> {
    let table = Table::parse(dataset, csv_data)?;
    let matric = table.column("Matriculation")?;
    let filename = table.column("Filename")?;
    let original = table.column("OriginalFilename")?;

    Ok(table
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| InputRecord {
            row: first_row + i,
            matriculation: cell(r, matric),
            filename: cell(r, filename),
            original_filename: cell(r, original),
        })
        .collect())
}

pub fn load_reference_records(
    dataset: &str,
    csv_data: &str,
    first_row: usize,
) -> Result<Vec<ReferenceRecord>, GradexError> {
    let table = Table::parse(dataset, csv_data)?;
    let matric = table.column("Matriculation")?;
    let original = table.column("OriginalFilename")?;

    Ok(table
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| ReferenceRecord {
            row: first_row + i,
            matriculation: cell(r, matric),
            original_filename: cell(r, original),
        })
        .collect())
}

pub fn load_rename_entries(
    dataset: &str,
    csv_data: &str,
    first_row: usize,
) -> Result<Vec<RenameEntry>, GradexError> {
    let table = Table::parse(dataset, csv_data)?;
    let before = table.column("Before")?;
    let after = table.column("After")?;

    Ok(table
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| RenameEntry {
            row: first_row + i,
            before: cell(r, before),
            after: cell(r, after),
        })
        .collect())
}

/// Append one export's flag cells to a cohort.
pub fn load_flag_cells(
    dataset: &str,
    csv_data: &str,
    columns: &[TallyColumn],
    cohort: &mut CohortData,
) -> Result<(), GradexError> {
    let table = Table::parse(dataset, csv_data)?;
    let indices = columns
        .iter()
        .map(|c| table.column(&c.column))
        .collect::<Result<Vec<_>, _>>()?;

    if cohort.values.len() < columns.len() {
        cohort.values.resize(columns.len(), Vec::new());
    }

    for record in &table.records {
        for (slot, &idx) in indices.iter().enumerate() {
            cohort.values[slot].push(cell(record, idx));
        }
    }
    cohort.rows += table.records.len();
    Ok(())
}
