use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradexError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (duplicate cohort, empty column list, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Missing required column in a dataset's header row.
    #[error("{dataset}: missing column '{column}'")]
    MissingColumn { dataset: String, column: String },
    /// Malformed CSV (bad quoting, invalid UTF-8, ...).
    #[error("{dataset}: CSV error: {message}")]
    Csv { dataset: String, message: String },
}

impl GradexError {
    pub(crate) fn csv(dataset: &str, err: csv::Error) -> Self {
        Self::Csv {
            dataset: dataset.into(),
            message: err.to_string(),
        }
    }
}
