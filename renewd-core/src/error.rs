//! Fatal startup error types.
//!
//! Only configuration and schedule-expression problems are fatal; every
//! site-facing failure is isolated inside the controller and recorded in
//! the pass outcome instead of propagating.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration file problems. Fatal at startup, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config parsed but fails validation.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// The configured cron expression is invalid.
    #[error("invalid crontab: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Cron expression parse errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Wrong number of whitespace-separated fields.
    #[error("expected 5 cron fields, found {0}")]
    FieldCount(usize),

    /// A field could not be parsed.
    #[error("invalid cron field '{field}': {detail}")]
    Field { field: String, detail: String },

    /// A value is outside its field's allowed range.
    #[error("cron value {value} out of range {min}..={max}")]
    OutOfRange { value: u32, min: u32, max: u32 },
}
