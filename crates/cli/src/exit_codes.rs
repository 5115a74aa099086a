//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | Misses found (only with `--strict-exit`)             |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | I/O error (unreadable input, unwritable output)      |
//! | 4    | CSV error (malformed file, missing column)           |
//! | 5    | Config invalid (TOML parse or validation failure)    |

use gradex_recon::GradexError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Unresolved misses in the matriculation or rename check.
/// Like `diff(1)`, exit 1 means "inputs disagree."
pub const EXIT_MISSES: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file or write the output file.
pub const EXIT_IO: u8 = 3;

/// Malformed CSV or a required column is absent.
pub const EXIT_CSV: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &GradexError) -> u8 {
    match err {
        GradexError::ConfigParse(_) | GradexError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        GradexError::MissingColumn { .. } | GradexError::Csv { .. } => EXIT_CSV,
    }
}
