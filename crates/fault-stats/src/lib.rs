//! Fault Flag Statistics
//!
//! Descriptive statistics computed from the engine's flag columns, consumed
//! by external reporting: time in fault, flag rates, sensor behavior while
//! flagged, and per-column summaries. No plotting or document generation
//! happens here.

mod describe;
mod summary;

pub use describe::ColumnStats;
pub use summary::FlagSummary;

use sensor_table::TableError;
use thiserror::Error;

/// Errors raised by statistics computation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatsError {
    /// Referenced column absent from the table
    #[error(transparent)]
    Table(#[from] TableError),

    /// Statistics over an empty table are undefined
    #[error("table has no rows")]
    EmptyTable,
}
