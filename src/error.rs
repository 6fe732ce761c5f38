//! Error types for dataset loading and the recent-races client.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading the source tables. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {table} table from {}: {source}", path.display())]
    Read {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} table row {row}: invalid value in column '{column}': {reason}")]
    InvalidValue {
        table: &'static str,
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("{table} table has duplicate id {id}")]
    DuplicateKey { table: &'static str, id: i64 },

    #[error("{table} table: {source}")]
    Column {
        table: &'static str,
        #[source]
        source: polars::error::PolarsError,
    },
}

/// Failure of the external race-results call. Recoverable: it becomes an
/// explicit "could not load" view.
#[derive(Debug, Error)]
pub enum ExternalFetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("results API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed results payload: {0}")]
    Payload(#[from] serde_json::Error),
}
