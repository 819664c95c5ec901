//! Pipeline error taxonomy.
//!
//! Sub-crates with extra failure sources (CSV, Arrow, Parquet) define their
//! own enums and wrap `TcError` as one variant.  Every failure is local and
//! synchronous; no variant implies a retry.

use thiserror::Error;

/// The top-level error type for `tc-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TcError {
    /// A malformed scalar, date, or delimited field in row-oriented input.
    /// Fails a single row; the caller decides whether to skip it.
    #[error("parse error: {0}")]
    Parse(String),

    /// An ill-formed XML document.  Aborts the whole document parse.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Combining flows whose `[begin, end)` windows differ, or flow lists of
    /// different lengths.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A value that must never exist, e.g. a measurement with an empty
    /// sensor id or a zone-aware timestamp.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `tc-*` crates.
pub type TcResult<T> = Result<T, TcError>;
