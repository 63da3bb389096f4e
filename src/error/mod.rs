//! Error handling for the I94 ETL pipeline.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Errors raised while loading, transforming or writing the I94 tables
#[derive(Debug, Error)]
pub enum EtlError {
    /// A label category marker is absent from the description file
    #[error("label category `{marker}` not found in description text")]
    NotFound { marker: String },

    /// A label category block has no terminating `;`
    #[error("label category `{marker}` is not terminated by `;`")]
    MalformedInput { marker: String },

    /// An input path could not be opened or read
    #[error("source {path} is unavailable: {reason}")]
    SourceUnavailable {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// An assembled table came out with zero rows
    #[error("no rows returned for {table} table")]
    EmptyResult { table: String },

    /// A table is missing a column or carries an unexpected type
    #[error("schema error: {0}")]
    Schema(String),

    /// Error raised by an Arrow compute kernel
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error writing or reading Parquet data
    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error reading delimited text
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Error converting records into Arrow batches
    #[error("serialization error: {0}")]
    Serde(#[from] serde_arrow::Error),

    /// Error loading settings
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Worker pool could not be started
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Filesystem error on the output side
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl EtlError {
    /// Create a source-unavailable error without an underlying IO error
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a column-not-found schema error
    pub fn column_not_found(column: &str) -> Self {
        Self::Schema(format!("column '{column}' not found"))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;
