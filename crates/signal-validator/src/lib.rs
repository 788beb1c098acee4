//! Analog Signal Validation
//!
//! Checks that percentage-typed AHU columns (valve commands, damper signals,
//! fan VFD speeds) hold floating-point fractions in the 0.0-1.0 convention.
//! Columns still carrying the raw 0-100 percentage encoding are rejected as
//! integer-coded; callers normalize before evaluation.

mod error;
mod validator;

pub use error::SignalError;
pub use validator::{validate_analog, validate_analog_values};
