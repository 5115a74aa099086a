// gradex - cross-checks for exam-submission CSV exports

mod check;
mod exit_codes;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use gradex_recon::rename::DEFAULT_TRIM_CHARS;
use gradex_recon::GradexError;

use check::OutputOptions;
use exit_codes::{engine_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "gradex")]
#[command(about = "Cross-check exam submission exports: matriculation, renames, quality flags")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only errors on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find ingest submissions with no counterpart in the checked export
    #[command(after_help = "\
Rows are matched on Matriculation first. Rows left over are retried by
comparing file stems (the name up to its first '.') of Filename and
OriginalFilename against the checked export's OriginalFilename.

Examples:
  gradex matric ingest-report.csv --checked checked.csv
  gradex matric part1.csv part2.csv --checked checked.csv --show-recovered")]
    Matric {
        /// Ingest report CSV(s); several files are concatenated in order
        #[arg(required = true)]
        ingest: Vec<PathBuf>,

        /// Checked/reference CSV (repeatable)
        #[arg(long, required = true)]
        checked: Vec<PathBuf>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Also list rows recovered by file name
        #[arg(long)]
        show_recovered: bool,

        /// Exit 1 when any submission is not found
        #[arg(long)]
        strict_exit: bool,
    },

    /// Check a Before/After rename log for names that were not produced
    #[command(after_help = "\
Each Before name is expected to appear among the After names with its
first N characters removed (N = --trim-chars).

Examples:
  gradex rename beforeafter.csv
  gradex rename beforeafter.csv --trim-chars 48 --json")]
    Rename {
        /// Rename log CSV(s) with Before and After columns
        #[arg(required = true)]
        logs: Vec<PathBuf>,

        /// Characters stripped from the front of each Before name
        #[arg(long, default_value_t = DEFAULT_TRIM_CHARS)]
        trim_chars: usize,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Exit 1 when any rename is missing
        #[arg(long)]
        strict_exit: bool,
    },

    /// Percentage of true quality flags per cohort and overall
    #[command(after_help = "\
Examples:
  gradex tally --cohort 'Third year=third-year.csv' --cohort 'MSc=msc.csv'
  gradex tally --cohort 'MSc=a.csv' --cohort 'MSc=b.csv' --column 'ScanRotated=Rotated'")]
    Tally {
        /// NAME=PATH; repeat a name to add more files to that cohort
        #[arg(long = "cohort", required = true, value_name = "NAME=PATH")]
        cohorts: Vec<String>,

        /// COLUMN or COLUMN=LABEL (default: ScanPerfect, HeadingPerfect, FilenamePerfect)
        #[arg(long = "column", value_name = "COLUMN[=LABEL]")]
        columns: Vec<String>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Run every check configured in a gradex.toml
    #[command(after_help = "\
Paths in the config are resolved relative to the config file.

Examples:
  gradex run gradex.toml
  gradex run gradex.toml --json --output report.json --strict-exit")]
    Run {
        /// Path to the gradex.toml config
        config: PathBuf,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit 1 when any check reports misses
        #[arg(long)]
        strict_exit: bool,

        /// Also list rows recovered by file name
        #[arg(long)]
        show_recovered: bool,
    },

    /// Parse and validate a gradex.toml without reading any CSV
    Validate {
        /// Path to the gradex.toml config
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    // RUST_LOG wins over the flags
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Matric { ingest, checked, json, show_recovered, strict_exit } => {
            let opts = OutputOptions { json, strict_exit, show_recovered, quiet, ..Default::default() };
            check::cmd_matric(ingest, checked, opts)
        }
        Commands::Rename { logs, trim_chars, json, strict_exit } => {
            let opts = OutputOptions { json, strict_exit, quiet, ..Default::default() };
            check::cmd_rename(logs, trim_chars, opts)
        }
        Commands::Tally { cohorts, columns, json } => {
            let opts = OutputOptions { json, quiet, ..Default::default() };
            check::cmd_tally(cohorts, columns, opts)
        }
        Commands::Run { config, json, output, strict_exit, show_recovered } => {
            let opts = OutputOptions { json, output, strict_exit, show_recovered, quiet };
            check::cmd_run(config, opts)
        }
        Commands::Validate { config } => check::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("error: {}", e.message);
            }
            if let Some(hint) = e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<GradexError> for CliError {
    fn from(err: GradexError) -> Self {
        let code = engine_exit_code(&err);
        let hint = match &err {
            GradexError::MissingColumn { column, .. } => {
                Some(format!("check that the export has a '{column}' header row"))
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
