//! Time-Indexed Sensor Table
//!
//! Provides the shared data carrier for AHU fault detection: a table of named
//! `f64` columns keyed by a monotonically non-decreasing timestamp index.
//! Rules read columns from the table and append derived flag columns; the
//! timestamp index itself is never mutated after construction.

mod table;

pub use table::SensorTable;

use thiserror::Error;

/// Errors raised by table construction and column access
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableError {
    /// A configured column name is absent from the table
    #[error("missing column: `{name}`")]
    MissingColumn { name: String },

    /// A column's length does not match the timestamp index
    #[error("column `{name}` has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A column with this name already exists
    #[error("column `{name}` already exists")]
    DuplicateColumn { name: String },

    /// Timestamps must be non-decreasing
    #[error("timestamp at row {index} precedes the previous row")]
    NonMonotonicTimestamps { index: usize },
}
