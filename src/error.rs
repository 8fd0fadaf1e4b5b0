//! Run-level error types
//!
//! Only failures that stop a run before (or instead of) loading live here.
//! Per-statement failures and unresolved references are reported, not raised.

use thiserror::Error;

use crate::store::SessionError;

#[derive(Error, Debug)]
pub enum LoaderError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV source
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON source
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML configuration
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration parsed but is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required column is absent from a source header
    #[error("Missing column '{0}' in source header")]
    MissingColumn(String),

    /// Source parsed but has the wrong shape
    #[error("Malformed source: {0}")]
    Source(String),

    /// Store session could not be established
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

pub type LoaderResult<T> = Result<T, LoaderError>;
