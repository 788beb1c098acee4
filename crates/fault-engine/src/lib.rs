//! AHU Fault Detection Engine
//!
//! Evaluates ASHRAE Guideline 36 style fault conditions against time-indexed
//! AHU sensor tables:
//! - Generic threshold rules driven by per-row predicates (fc1-fc3, fc5-fc13)
//! - Operating mode classification (heating / econ / econ+mech / mech)
//! - Hunting detection via hourly operating-state change counts (fc4)
//! - Batch evaluation of independent rules over a shared table
//!
//! Rules read the caller's table and return an augmented copy with a 0/1
//! flag column appended; the input is never mutated.

pub mod catalog;
pub mod config;
pub mod hunting;
pub mod modes;
pub mod predicate;
pub mod rule;
pub mod runner;

pub use catalog::{
    fault_condition_eight, fault_condition_eleven, fault_condition_five, fault_condition_nine,
    fault_condition_one, fault_condition_seven, fault_condition_six, fault_condition_ten,
    fault_condition_thirteen, fault_condition_three, fault_condition_twelve, fault_condition_two,
    CoolingSupplySetpointConfig, DuctStaticConfig, EconOutsideTempConfig, EconSupplyMixConfig,
    MixedAirTempConfig, OutsideAirFractionConfig, OutsideMixMatchConfig, SupplyAboveMixConfig,
    SupplyTempHeatingConfig, SupplyTempSetpointConfig,
};
pub use config::ConfigError;
pub use hunting::{HuntingConfig, HuntingRule, TransitionCounts};
pub use modes::{ModeConfig, OperatingMode};
pub use rule::{FaultCondition, FaultRule, ModeGate};
pub use runner::{RuleOutcome, RuleSet};

use sensor_table::TableError;
use signal_validator::SignalError;
use thiserror::Error;

/// Errors raised by rule evaluation.
///
/// Every error is local to the failing rule: the shared input table is never
/// left partially modified, and sibling rules in a batch are unaffected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FaultError {
    /// Missing column or table shape violation
    #[error(transparent)]
    Table(#[from] TableError),

    /// Analog column failed the 0-1 fraction check
    #[error(transparent)]
    Signal(#[from] SignalError),
}
