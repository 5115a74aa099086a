use std::collections::HashSet;

use serde::Deserialize;

use crate::error::GradexError;
use crate::rename::DEFAULT_TRIM_CHARS;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GradexConfig {
    pub name: String,
    #[serde(default)]
    pub matric: Option<MatricConfig>,
    #[serde(default)]
    pub rename: Option<RenameConfig>,
    #[serde(default)]
    pub tally: Option<TallyConfig>,
}

// ---------------------------------------------------------------------------
// File lists
// ---------------------------------------------------------------------------

/// One path or several; several are concatenated in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileList {
    One(String),
    Many(Vec<String>),
}

impl FileList {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::One(p) => vec![p.as_str()],
            Self::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.paths().iter().all(|p| p.trim().is_empty())
    }
}

impl From<Vec<String>> for FileList {
    fn from(paths: Vec<String>) -> Self {
        Self::Many(paths)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MatricConfig {
    pub ingest: FileList,
    pub checked: FileList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameConfig {
    pub file: FileList,
    #[serde(default = "default_trim_chars")]
    pub trim_chars: usize,
}

fn default_trim_chars() -> usize {
    DEFAULT_TRIM_CHARS
}

#[derive(Debug, Clone, Deserialize)]
pub struct TallyConfig {
    #[serde(default = "default_columns")]
    pub columns: Vec<TallyColumn>,
    #[serde(default)]
    pub cohorts: Vec<CohortConfig>,
}

/// A flag column and the label it is reported under.
/// An empty label falls back to the column name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TallyColumn {
    pub column: String,
    #[serde(default)]
    pub label: String,
}

impl TallyColumn {
    pub fn new(column: impl Into<String>, label: Option<String>) -> Self {
        let column = column.into();
        let label = label.filter(|l| !l.is_empty()).unwrap_or_else(|| column.clone());
        Self { column, label }
    }
}

pub fn default_columns() -> Vec<TallyColumn> {
    vec![
        TallyColumn::new("ScanPerfect", Some("Good scan".into())),
        TallyColumn::new("HeadingPerfect", Some("Correct heading".into())),
        TallyColumn::new("FilenamePerfect", Some("Correct filename".into())),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohortConfig {
    pub name: String,
    pub files: FileList,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl GradexConfig {
    pub fn from_toml(input: &str) -> Result<Self, GradexError> {
        let mut config: GradexConfig =
            toml::from_str(input).map_err(|e| GradexError::ConfigParse(e.to_string()))?;
        if let Some(tally) = config.tally.as_mut() {
            for col in &mut tally.columns {
                if col.label.is_empty() {
                    col.label = col.column.clone();
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GradexError> {
        if self.name.trim().is_empty() {
            return Err(GradexError::ConfigValidation("name must not be empty".into()));
        }

        if self.matric.is_none() && self.rename.is_none() && self.tally.is_none() {
            return Err(GradexError::ConfigValidation(
                "at least one of [matric], [rename] or [tally] is required".into(),
            ));
        }

        if let Some(ref m) = self.matric {
            if m.ingest.is_empty() {
                return Err(GradexError::ConfigValidation("matric.ingest lists no files".into()));
            }
            if m.checked.is_empty() {
                return Err(GradexError::ConfigValidation("matric.checked lists no files".into()));
            }
        }

        if let Some(ref r) = self.rename {
            if r.file.is_empty() {
                return Err(GradexError::ConfigValidation("rename.file lists no files".into()));
            }
        }

        if let Some(ref t) = self.tally {
            validate_tally(t)?;
        }

        Ok(())
    }
}

pub(crate) fn validate_tally(tally: &TallyConfig) -> Result<(), GradexError> {
    if tally.columns.is_empty() {
        return Err(GradexError::ConfigValidation("tally.columns must not be empty".into()));
    }
    if let Some(col) = tally.columns.iter().find(|c| c.column.trim().is_empty()) {
        return Err(GradexError::ConfigValidation(format!(
            "tally column with label '{}' has no column name",
            col.label
        )));
    }
    if tally.cohorts.is_empty() {
        return Err(GradexError::ConfigValidation("tally needs at least one cohort".into()));
    }

    let mut seen = HashSet::new();
    for cohort in &tally.cohorts {
        if cohort.name.trim().is_empty() {
            return Err(GradexError::ConfigValidation("cohort name must not be empty".into()));
        }
        if !seen.insert(cohort.name.as_str()) {
            return Err(GradexError::ConfigValidation(format!(
                "duplicate cohort '{}'",
                cohort.name
            )));
        }
        if cohort.files.is_empty() {
            return Err(GradexError::ConfigValidation(format!(
                "cohort '{}' lists no files",
                cohort.name
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
