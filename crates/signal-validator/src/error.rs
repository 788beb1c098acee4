//! Signal Validation Error Types

use sensor_table::TableError;
use thiserror::Error;

/// Errors during analog signal validation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SignalError {
    /// Column looks integer-coded (whole numbers above 1.0, the 0-100 convention)
    #[error("column `{column}` is not a 0-1 analog fraction: value {value} looks integer-coded")]
    InvalidSignalType { column: String, value: f64 },

    /// Value outside the 0.0-1.0 analog range
    #[error("column `{column}` value {value} is outside the analog range [0.0, 1.0]")]
    InvalidSignalRange { column: String, value: f64 },

    /// Referenced column absent from the table
    #[error(transparent)]
    Table(#[from] TableError),
}
