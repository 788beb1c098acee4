//! Rule Contract and Generic Threshold Rule
//!
//! Every fault condition satisfies the same contract: built once from a
//! validated configuration, then `evaluate` takes a time-indexed table and
//! returns an augmented copy with a 0/1 flag column named after the rule.
//! The threshold rules share one generic implementation driven by a
//! predicate; only the hunting counter has its own evaluate.

use crate::modes::{ModeConfig, OperatingMode};
use crate::predicate::{ColumnView, Predicate};
use crate::FaultError;
use sensor_table::SensorTable;
use signal_validator::validate_analog;
use tracing::debug;

/// Shared contract for all fault conditions.
///
/// Implementations are immutable after construction and evaluation is pure,
/// so a batch of rules can run concurrently over one shared table.
pub trait FaultCondition {
    /// Rule identifier, e.g. `fc2`
    fn id(&self) -> &str;

    /// Name of the appended flag column, e.g. `fc2_flag`
    fn flag_column(&self) -> &str;

    /// Evaluate against a table; returns the table plus the flag column.
    ///
    /// The input is never mutated. Threshold rules keep the input cadence;
    /// the hunting counter returns an hour-cadence table instead.
    fn evaluate(&self, table: &SensorTable) -> Result<SensorTable, FaultError>;
}

/// Restricts a rule to rows classified into one of the listed modes
#[derive(Debug, Clone)]
pub struct ModeGate {
    pub config: ModeConfig,
    pub modes: Vec<OperatingMode>,
}

/// Generic threshold fault rule.
///
/// Construct through the [`crate::catalog`] functions, which validate the
/// configuration and assemble the predicate.
#[derive(Debug, Clone)]
pub struct FaultRule {
    id: String,
    flag_col: String,
    predicate: Predicate,
    /// Percentage-typed columns checked by the signal validator before
    /// threshold logic runs (the mode gate validates its own four)
    analog_cols: Vec<String>,
    mode_gate: Option<ModeGate>,
    troubleshoot: bool,
}

impl FaultRule {
    pub(crate) fn new(
        id: impl Into<String>,
        predicate: Predicate,
        analog_cols: Vec<String>,
        mode_gate: Option<ModeGate>,
    ) -> Self {
        let id = id.into();
        let flag_col = format!("{id}_flag");
        Self {
            id,
            flag_col,
            predicate,
            analog_cols,
            mode_gate,
            troubleshoot: false,
        }
    }

    /// Enable the diagnostics hook: evaluation additionally appends
    /// intermediate columns (per-comparison checks, mode indicators).
    /// Flag values are never affected.
    pub fn with_troubleshoot(mut self, enabled: bool) -> Self {
        self.troubleshoot = enabled;
        self
    }

    /// Compute the per-row flags without building an output table
    pub fn flags(&self, table: &SensorTable) -> Result<Vec<bool>, FaultError> {
        let (flags, _) = self.flags_and_modes(table)?;
        Ok(flags)
    }

    fn flags_and_modes(
        &self,
        table: &SensorTable,
    ) -> Result<(Vec<bool>, Option<Vec<Option<OperatingMode>>>), FaultError> {
        let analog: Vec<&str> = self.analog_cols.iter().map(String::as_str).collect();
        validate_analog(table, &analog)?;

        // Resolve every binding before evaluating any row, so a missing
        // column aborts with no partial work.
        let view = ColumnView::resolve(table, self.predicate.columns())?;

        let modes = match &self.mode_gate {
            Some(gate) => Some(gate.config.classify_table(table)?),
            None => None,
        };

        let flags = (0..table.len())
            .map(|row| {
                let gated_in = match (&self.mode_gate, &modes) {
                    (Some(gate), Some(modes)) => {
                        modes[row].is_some_and(|m| gate.modes.contains(&m))
                    }
                    _ => true,
                };
                gated_in && self.predicate.holds(row, &view)
            })
            .collect();
        Ok((flags, modes))
    }
}

impl FaultCondition for FaultRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn flag_column(&self) -> &str {
        &self.flag_col
    }

    fn evaluate(&self, table: &SensorTable) -> Result<SensorTable, FaultError> {
        let (flags, modes) = self.flags_and_modes(table)?;
        let flagged = flags.iter().filter(|&&f| f).count();
        debug!(rule = %self.id, rows = table.len(), flagged, "rule evaluated");

        let mut out = table.clone();
        if self.troubleshoot {
            self.append_diagnostics(&mut out, modes.as_deref())?;
        }
        out.set_flag_column(&self.flag_col, &flags)?;
        Ok(out)
    }
}

impl FaultRule {
    /// Intermediate columns for troubleshooting: one 0/1 column per
    /// comparison in the predicate, plus the mode indicators when gated.
    fn append_diagnostics(
        &self,
        out: &mut SensorTable,
        modes: Option<&[Option<OperatingMode>]>,
    ) -> Result<(), FaultError> {
        let checks: Vec<(String, Vec<bool>)> = {
            let view = ColumnView::resolve(out, self.predicate.columns())?;
            self.predicate
                .comparisons()
                .iter()
                .enumerate()
                .map(|(i, cmp)| {
                    let name = format!("{}_check_{}", self.id, i + 1);
                    let held = (0..out.len()).map(|row| cmp.holds(row, &view)).collect();
                    (name, held)
                })
                .collect()
        };
        for (name, held) in checks {
            debug!(rule = %self.id, column = %name, "appending diagnostic column");
            out.set_flag_column(name, &held)?;
        }
        if let Some(modes) = modes {
            for mode in OperatingMode::ALL {
                let indicator: Vec<bool> = modes.iter().map(|m| *m == Some(mode)).collect();
                out.set_flag_column(mode.column_name(), &indicator)?;
            }
        }
        Ok(())
    }
}
