//! `gradex run|validate|matric|rename|tally`: load CSV exports, run the
//! engine, print the report.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gradex_recon::config::{
    default_columns, CohortConfig, FileList, GradexConfig, MatricConfig, RenameConfig,
    TallyColumn, TallyConfig,
};
use gradex_recon::engine::{
    load_flag_cells, load_input_records, load_reference_records, load_rename_entries,
};
use gradex_recon::model::{CohortData, GradexInput, GradexReport, MatricInput};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_IO, EXIT_MISSES};
use crate::render::{render_report, summary_line};
use crate::CliError;

/// How a finished report is emitted.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub output: Option<PathBuf>,
    pub strict_exit: bool,
    pub show_recovered: bool,
    pub quiet: bool,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn cmd_run(config_path: PathBuf, opts: OutputOptions) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    // Paths in the config are relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    run_and_emit(&config, base_dir, &opts)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let mut checks = Vec::new();
    if config.matric.is_some() {
        checks.push("matric".to_string());
    }
    if config.rename.is_some() {
        checks.push("rename".to_string());
    }
    if let Some(ref t) = config.tally {
        checks.push(format!("tally ({} cohort(s))", t.cohorts.len()));
    }
    eprintln!("valid: '{}' with {}", config.name, checks.join(", "));
    Ok(())
}

pub fn cmd_matric(ingest: Vec<PathBuf>, checked: Vec<PathBuf>, opts: OutputOptions) -> Result<(), CliError> {
    let config = GradexConfig {
        name: "matric".into(),
        matric: Some(MatricConfig {
            ingest: file_list(&ingest),
            checked: file_list(&checked),
        }),
        rename: None,
        tally: None,
    };
    config.validate()?;
    run_and_emit(&config, Path::new("."), &opts)
}

pub fn cmd_rename(logs: Vec<PathBuf>, trim_chars: usize, opts: OutputOptions) -> Result<(), CliError> {
    let config = GradexConfig {
        name: "rename".into(),
        matric: None,
        rename: Some(RenameConfig {
            file: file_list(&logs),
            trim_chars,
        }),
        tally: None,
    };
    config.validate()?;
    run_and_emit(&config, Path::new("."), &opts)
}

pub fn cmd_tally(cohort_args: Vec<String>, column_args: Vec<String>, opts: OutputOptions) -> Result<(), CliError> {
    let cohorts = parse_cohorts(&cohort_args)?;
    let columns = if column_args.is_empty() {
        default_columns()
    } else {
        column_args.iter().map(|a| parse_column(a)).collect()
    };

    let config = GradexConfig {
        name: "tally".into(),
        matric: None,
        rename: None,
        tally: Some(TallyConfig { columns, cohorts }),
    };
    config.validate()?;
    run_and_emit(&config, Path::new("."), &opts)
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn file_list(paths: &[PathBuf]) -> FileList {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .into()
}

/// `NAME=PATH`; repeating a name appends another file to that cohort.
pub(crate) fn parse_cohorts(args: &[String]) -> Result<Vec<CohortConfig>, CliError> {
    let mut cohorts: Vec<(String, Vec<String>)> = Vec::new();
    for arg in args {
        let (name, path) = arg.split_once('=').ok_or_else(|| {
            CliError::args(format!("invalid --cohort {arg:?}"))
                .with_hint("expected NAME=PATH, e.g. --cohort 'Third year=third-year.csv'")
        })?;
        match cohorts.iter_mut().find(|(n, _)| n == name) {
            Some((_, files)) => files.push(path.to_string()),
            None => cohorts.push((name.to_string(), vec![path.to_string()])),
        }
    }
    Ok(cohorts
        .into_iter()
        .map(|(name, files)| CohortConfig {
            name,
            files: files.into(),
        })
        .collect())
}

/// `COLUMN` or `COLUMN=LABEL`.
pub(crate) fn parse_column(arg: &str) -> TallyColumn {
    match arg.split_once('=') {
        Some((column, label)) => TallyColumn::new(column, Some(label.to_string())),
        None => TallyColumn::new(arg, None),
    }
}

// ---------------------------------------------------------------------------
// Load + run + emit
// ---------------------------------------------------------------------------

fn read_config(config_path: &Path) -> Result<GradexConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(EXIT_IO, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    GradexConfig::from_toml(&config_str).map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))
}

fn read_csv(base_dir: &Path, file: &str) -> Result<(String, String), CliError> {
    let path = base_dir.join(file);
    let data = std::fs::read_to_string(&path)
        .map_err(|e| CliError::new(EXIT_IO, format!("cannot read {}: {e}", path.display())))?;
    log::info!("read {} ({} bytes)", path.display(), data.len());
    Ok((path.display().to_string(), data))
}

/// Read every file of a list and concatenate the loaded rows, numbering
/// rows continuously across files.
fn load_all<T>(
    base_dir: &Path,
    files: &FileList,
    load: impl Fn(&str, &str, usize) -> Result<Vec<T>, gradex_recon::GradexError>,
) -> Result<Vec<T>, CliError> {
    let mut rows = Vec::new();
    for file in files.paths() {
        let (dataset, data) = read_csv(base_dir, file)?;
        let loaded = load(&dataset, &data, rows.len())?;
        log::info!("{dataset}: {} row(s)", loaded.len());
        rows.extend(loaded);
    }
    Ok(rows)
}

pub(crate) fn load_input(config: &GradexConfig, base_dir: &Path) -> Result<GradexInput, CliError> {
    let mut input = GradexInput::default();

    if let Some(ref m) = config.matric {
        input.matric = Some(MatricInput {
            inputs: load_all(base_dir, &m.ingest, load_input_records)?,
            references: load_all(base_dir, &m.checked, load_reference_records)?,
        });
    }

    if let Some(ref r) = config.rename {
        input.rename = Some(load_all(base_dir, &r.file, load_rename_entries)?);
    }

    if let Some(ref t) = config.tally {
        let mut cohorts = Vec::with_capacity(t.cohorts.len());
        for c in &t.cohorts {
            let mut data = CohortData::new(c.name.clone(), t.columns.len());
            for file in c.files.paths() {
                let (dataset, csv) = read_csv(base_dir, file)?;
                load_flag_cells(&dataset, &csv, &t.columns, &mut data)?;
            }
            cohorts.push(data);
        }
        input.cohorts = Some(cohorts);
    }

    Ok(input)
}

fn run_and_emit(config: &GradexConfig, base_dir: &Path, opts: &OutputOptions) -> Result<(), CliError> {
    let input = load_input(config, base_dir)?;
    let report = gradex_recon::run(config, &input)?;
    emit(&report, opts)
}

fn emit(report: &GradexReport, opts: &OutputOptions) -> Result<(), CliError> {
    let needs_json = opts.json || opts.output.is_some();
    let json_str = if needs_json {
        Some(
            serde_json::to_string_pretty(report)
                .map_err(|e| CliError::new(EXIT_IO, format!("JSON serialization error: {e}")))?,
        )
    } else {
        None
    };

    if let (Some(path), Some(json)) = (&opts.output, &json_str) {
        std::fs::write(path, json)
            .map_err(|e| CliError::new(EXIT_IO, format!("cannot write output: {e}")))?;
        if !opts.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match (&json_str, opts.json) {
        (Some(json), true) => {
            writeln!(handle, "{json}").map_err(|e| CliError::io(e.to_string()))?;
            if !opts.quiet {
                eprintln!("{}", summary_line(report));
            }
        }
        _ => render_report(&mut handle, report, opts.show_recovered)
            .map_err(|e| CliError::io(e.to_string()))?,
    }

    let misses = report.miss_count();
    if opts.strict_exit && misses > 0 {
        return Err(CliError::new(EXIT_MISSES, format!("{misses} record(s) not found")));
    }
    Ok(())
}
