//! Error types for the divergence pipeline.
//!
//! The two core stages only ever fail on schema problems, so they return
//! [`SchemaError`] directly. File I/O and configuration loading wrap it in
//! the top-level [`DklError`].

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// A required column is absent or cannot be coerced to its expected type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// One or more required columns are absent
    #[error("missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        /// Every absent column, in the order they were required
        columns: Vec<String>,
    },

    /// A numeric column holds a value that does not parse as a number
    #[error("column `{column}` is not numeric: row {row} holds {value:?}")]
    NonNumeric {
        /// Column name
        column: String,
        /// Zero-based row index
        row: usize,
        /// Offending raw value
        value: String,
    },

    /// A column does not match the frame's row count
    #[error("column `{column}` has {actual} rows, frame has {expected}")]
    LengthMismatch {
        /// Column name
        column: String,
        /// Frame row count
        expected: usize,
        /// Column row count
        actual: usize,
    },
    /// The columnar backend rejected an operation (cast, take, batch assembly)
    #[error("arrow: {0}")]
    Arrow(String),
}

impl From<ArrowError> for SchemaError {
    fn from(err: ArrowError) -> Self {
        SchemaError::Arrow(err.to_string())
    }
}

/// Configuration problems.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A field is out of its allowed range
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Vintage key not present in the static registry
    #[error("unknown vintage `{0}`")]
    UnknownVintage(String),

    /// Category slug not recognised
    #[error("unknown category `{0}` (expected race, income, educ or empl)")]
    UnknownCategory(String),
}

/// Top-level error for file-backed runs.
#[derive(Debug, Error)]
pub enum DklError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow: {0}")]
    Arrow(#[from] ArrowError),

    /// Unreadable or unwritable Parquet file
    #[error("parquet: {0}")]
    Parquet(#[from] ParquetError),

    /// Malformed JSON configuration
    #[error("malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for file-backed operations.
pub type Result<T> = std::result::Result<T, DklError>;
