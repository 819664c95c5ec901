//! Error types for tc-table.

use thiserror::Error;

use tc_core::TcError;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Core(#[from] TcError),

    /// A batch lacks a required column or has one of the wrong type.
    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Alias for `Result<T, TableError>`.
pub type TableResult<T> = Result<T, TableError>;
