//! Operating Mode Classification
//!
//! Derives the AHU operating state from heating valve, cooling valve, supply
//! fan speed, and economizer damper signals. Classification is a single
//! partition function returning at most one mode per row, so mutual
//! exclusivity holds by construction. Rows matching no physically meaningful
//! combination (fan off, both valves open, damper below minimum) stay
//! unclassified - they are excluded from mode-gated rules and hunting counts,
//! not flagged as faults.

use crate::config::{check_analog_level, check_column, ConfigError};
use crate::FaultError;
use sensor_table::SensorTable;
use serde::{Deserialize, Serialize};
use signal_validator::validate_analog;

/// AHU operating state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Heating valve modulating, damper at minimum outside air
    HeatingOnly,
    /// Free cooling only: damper modulating above minimum, both valves closed
    EconOnly,
    /// Damper above minimum with mechanical cooling assisting
    EconPlusMech,
    /// Mechanical cooling with damper at minimum outside air
    MechOnly,
}

impl OperatingMode {
    pub const ALL: [OperatingMode; 4] = [
        OperatingMode::HeatingOnly,
        OperatingMode::EconOnly,
        OperatingMode::EconPlusMech,
        OperatingMode::MechOnly,
    ];

    /// Column name used for this mode's 0/1 indicator in diagnostic and
    /// hunting output
    pub fn column_name(self) -> &'static str {
        match self {
            OperatingMode::HeatingOnly => "heating_mode",
            OperatingMode::EconOnly => "econ_only_cooling_mode",
            OperatingMode::EconPlusMech => "econ_plus_mech_cooling_mode",
            OperatingMode::MechOnly => "mech_cooling_only_mode",
        }
    }
}

/// Column bindings and damper minimum for mode classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Economizer (outside air damper) command column, 0-1
    pub economizer_sig_col: String,
    /// Heating valve command column, 0-1
    pub heating_sig_col: String,
    /// Cooling valve command column, 0-1
    pub cooling_sig_col: String,
    /// Supply fan VFD speed column, 0-1
    pub supply_vfd_speed_col: String,
    /// Commanded minimum outside-air damper position, 0-1
    pub ahu_min_oa_dpr: f64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            economizer_sig_col: "economizer_sig".to_string(),
            heating_sig_col: "heating_sig".to_string(),
            cooling_sig_col: "cooling_sig".to_string(),
            supply_vfd_speed_col: "supply_vfd_speed".to_string(),
            ahu_min_oa_dpr: 0.20,
        }
    }
}

impl ModeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_column("economizer_sig_col", &self.economizer_sig_col)?;
        check_column("heating_sig_col", &self.heating_sig_col)?;
        check_column("cooling_sig_col", &self.cooling_sig_col)?;
        check_column("supply_vfd_speed_col", &self.supply_vfd_speed_col)?;
        check_analog_level("ahu_min_oa_dpr", self.ahu_min_oa_dpr)
    }

    /// The four analog columns classification reads
    pub fn columns(&self) -> [&str; 4] {
        [
            &self.economizer_sig_col,
            &self.heating_sig_col,
            &self.cooling_sig_col,
            &self.supply_vfd_speed_col,
        ]
    }

    /// Classify one row of signals.
    ///
    /// The fan must be running to be in any mode. The damper comparison is
    /// exact: units commanded from the same minimum constant match it.
    /// NaN in any signal leaves the row unclassified.
    pub fn classify(
        &self,
        heating: f64,
        cooling: f64,
        fan_speed: f64,
        economizer: f64,
    ) -> Option<OperatingMode> {
        if !(fan_speed > 0.0) {
            return None;
        }
        let at_min = economizer == self.ahu_min_oa_dpr;
        let above_min = economizer > self.ahu_min_oa_dpr;

        if heating > 0.0 && cooling == 0.0 && at_min {
            Some(OperatingMode::HeatingOnly)
        } else if heating == 0.0 && cooling == 0.0 && above_min {
            Some(OperatingMode::EconOnly)
        } else if heating == 0.0 && cooling > 0.0 && above_min {
            Some(OperatingMode::EconPlusMech)
        } else if heating == 0.0 && cooling > 0.0 && at_min {
            Some(OperatingMode::MechOnly)
        } else {
            None
        }
    }

    /// Classify every row of a table.
    ///
    /// Validates the four signal columns as 0-1 analog fractions first.
    pub fn classify_table(
        &self,
        table: &SensorTable,
    ) -> Result<Vec<Option<OperatingMode>>, FaultError> {
        validate_analog(table, &self.columns())?;
        let econ = table.column(&self.economizer_sig_col)?;
        let heating = table.column(&self.heating_sig_col)?;
        let cooling = table.column(&self.cooling_sig_col)?;
        let fan = table.column(&self.supply_vfd_speed_col)?;
        Ok((0..table.len())
            .map(|i| self.classify(heating[i], cooling[i], fan[i], econ[i]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> ModeConfig {
        ModeConfig::default()
    }

    #[test]
    fn test_heating_only() {
        // htg > 0, clg == 0, fan > 0, damper at minimum
        let mode = config().classify(0.6, 0.0, 0.8, 0.20);
        assert_eq!(mode, Some(OperatingMode::HeatingOnly));
    }

    #[test]
    fn test_econ_only() {
        let mode = config().classify(0.0, 0.0, 0.8, 0.55);
        assert_eq!(mode, Some(OperatingMode::EconOnly));
    }

    #[test]
    fn test_econ_plus_mech() {
        let mode = config().classify(0.0, 0.4, 0.8, 0.55);
        assert_eq!(mode, Some(OperatingMode::EconPlusMech));
    }

    #[test]
    fn test_mech_only() {
        let mode = config().classify(0.0, 0.4, 0.8, 0.20);
        assert_eq!(mode, Some(OperatingMode::MechOnly));
    }

    #[test]
    fn test_fan_off_unclassified() {
        assert_eq!(config().classify(0.6, 0.0, 0.0, 0.20), None);
    }

    #[test]
    fn test_simultaneous_heating_cooling_unclassified() {
        assert_eq!(config().classify(0.5, 0.5, 0.8, 0.20), None);
    }

    #[test]
    fn test_damper_below_minimum_unclassified() {
        assert_eq!(config().classify(0.0, 0.4, 0.8, 0.10), None);
    }

    #[test]
    fn test_nan_signals_unclassified() {
        assert_eq!(config().classify(f64::NAN, 0.0, 0.8, 0.20), None);
        assert_eq!(config().classify(0.5, 0.0, f64::NAN, 0.20), None);
    }

    #[test]
    fn test_validate_rejects_bad_damper_minimum() {
        let cfg = ModeConfig {
            ahu_min_oa_dpr: 20.0,
            ..ModeConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::AnalogLevelOutOfRange { .. })
        ));
    }

    proptest! {
        /// At most one mode can ever be produced for a row: classification is
        /// a single partition function, exercised here over arbitrary signals.
        #[test]
        fn prop_classification_is_exclusive(
            heating in proptest::option::of(0.0f64..=1.0),
            cooling in proptest::option::of(0.0f64..=1.0),
            fan in proptest::option::of(0.0f64..=1.0),
            econ in proptest::option::of(0.0f64..=1.0),
        ) {
            let cfg = config();
            let to_val = |v: Option<f64>| v.unwrap_or(f64::NAN);
            let mode = cfg.classify(to_val(heating), to_val(cooling), to_val(fan), to_val(econ));
            // The indicator-column rendering of `mode` has at most one bit set.
            let set: usize = OperatingMode::ALL
                .iter()
                .filter(|&&m| mode == Some(m))
                .count();
            prop_assert!(set <= 1);
            // Fan off or NaN never classifies.
            if !(to_val(fan) > 0.0) {
                prop_assert_eq!(mode, None);
            }
        }
    }
}
