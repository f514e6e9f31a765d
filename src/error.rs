//! Error types for moncal.

use thiserror::Error;

/// Errors raised at the table store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Could not decode row: {0}")]
    Decode(String),

    #[error("Column '{column}' of table '{table}' can not be updated")]
    Immutable { table: &'static str, column: String },

    #[error("No row in '{table}' with id {id}")]
    NotFound { table: &'static str, id: i64 },

    #[error("Invalid record: {0}")]
    Invalid(#[from] RecordError),
}

/// Result type alias for table store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Violations of the `EventRecord` invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Event name must not be empty")]
    EmptyName,

    #[error("A recurring event needs a start date")]
    MissingStartDate,

    #[error("A single event needs a date")]
    MissingDate,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config '{path}': {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },
}
