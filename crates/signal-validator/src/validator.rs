//! Analog Range and Encoding Checks

use crate::SignalError;
use sensor_table::SensorTable;
use tracing::debug;

/// Validate that the named columns hold 0-1 analog fractions.
///
/// Runs before any threshold logic. Pure check: the table is never modified.
/// NaN values pass (sparse telemetry is handled downstream by the rules'
/// conservative no-flag comparisons).
pub fn validate_analog(table: &SensorTable, columns: &[&str]) -> Result<(), SignalError> {
    for &name in columns {
        let values = table.column(name)?;
        validate_analog_values(name, values)?;
    }
    Ok(())
}

/// Validate a single column's values against the 0-1 analog convention.
///
/// A column whose non-NaN values are all whole numbers with at least one
/// above 1.0 is integer-coded (the 0-100 percentage encoding) and fails with
/// [`SignalError::InvalidSignalType`]. Any other value outside [0.0, 1.0]
/// fails with [`SignalError::InvalidSignalRange`].
pub fn validate_analog_values(column: &str, values: &[f64]) -> Result<(), SignalError> {
    let mut all_whole = true;
    let mut first_above_one = None;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        if v.fract() != 0.0 {
            all_whole = false;
        }
        if v > 1.0 && first_above_one.is_none() {
            first_above_one = Some(v);
        }
    }

    if all_whole {
        if let Some(value) = first_above_one {
            debug!(column, value, "analog column rejected as integer-coded");
            return Err(SignalError::InvalidSignalType {
                column: column.to_string(),
                value,
            });
        }
    }

    for &v in values {
        if v.is_nan() {
            continue;
        }
        if !(0.0..=1.0).contains(&v) {
            debug!(column, value = v, "analog column value out of range");
            return Err(SignalError::InvalidSignalRange {
                column: column.to_string(),
                value: v,
            });
        }
    }
    Ok(())
}
