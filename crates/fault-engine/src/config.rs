//! Rule Configuration Validation
//!
//! Every rule constructor validates its named parameters up front and refuses
//! to build an inconsistent rule; evaluation never sees a bad threshold.

use thiserror::Error;

/// Errors raised at rule construction
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Thresholds are two-sided tolerances and must be finite
    #[error("threshold `{name}` must be finite, got {value}")]
    NonFiniteThreshold { name: &'static str, value: f64 },

    /// Thresholds are two-sided tolerances and must be non-negative
    #[error("threshold `{name}` must be non-negative, got {value}")]
    NegativeThreshold { name: &'static str, value: f64 },

    /// A column binding resolved to an empty string
    #[error("column binding `{name}` must not be empty")]
    EmptyColumnName { name: &'static str },

    /// Analog levels (damper minimum, valve saturation point) live in [0, 1]
    #[error("analog level `{name}` must lie in [0.0, 1.0], got {value}")]
    AnalogLevelOutOfRange { name: &'static str, value: f64 },

    /// The hunting counter needs a positive change budget
    #[error("delta_os_max must be at least 1")]
    ZeroMaxChanges,
}

/// Check a tolerance threshold: finite and non-negative.
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteThreshold { name, value });
    }
    if value < 0.0 {
        return Err(ConfigError::NegativeThreshold { name, value });
    }
    Ok(())
}

/// Check an analog level parameter: finite and within [0, 1].
pub(crate) fn check_analog_level(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::AnalogLevelOutOfRange { name, value });
    }
    Ok(())
}

/// Check a column binding: must be a non-empty name.
pub(crate) fn check_column(name: &'static str, binding: &str) -> Result<(), ConfigError> {
    if binding.is_empty() {
        return Err(ConfigError::EmptyColumnName { name });
    }
    Ok(())
}
