//! `gradex-recon`: cross-check engine for exam-submission CSV exports.
//!
//! Pure engine crate: receives CSV text or pre-loaded records, returns
//! typed reports. No CLI or filesystem dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod missing;
pub mod model;
pub mod rename;
pub mod stem;
pub mod tally;

pub use config::GradexConfig;
pub use engine::run;
pub use error::GradexError;
pub use model::{GradexInput, GradexReport, InputRecord, ReferenceRecord};
