//! Hunting Detection (fc4)
//!
//! Flags control instability: the AHU rapidly cycling between operating
//! modes. Rows are classified, bucketed by wall-clock hour, and each hour
//! counts the rising edges into every mode - the number of times the unit
//! *entered* heating, econ, econ+mech, or mech cooling. An hour whose peak
//! per-mode entry count strictly exceeds the configured maximum flags.
//!
//! This is the one rule whose output cadence differs from its input: the
//! returned table is hourly.

use crate::config::ConfigError;
use crate::modes::{ModeConfig, OperatingMode};
use crate::rule::FaultCondition;
use crate::FaultError;
use chrono::{DateTime, Timelike, Utc};
use sensor_table::SensorTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hunting counter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntingConfig {
    /// Mode classification bindings and damper minimum
    pub mode: ModeConfig,
    /// Maximum allowed operating-state changes per hour
    pub delta_os_max: u32,
}

impl Default for HuntingConfig {
    fn default() -> Self {
        Self {
            mode: ModeConfig::default(),
            delta_os_max: 7,
        }
    }
}

impl HuntingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mode.validate()?;
        if self.delta_os_max == 0 {
            return Err(ConfigError::ZeroMaxChanges);
        }
        Ok(())
    }
}

/// Per-hour count of entries into each operating mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCounts {
    pub heating: u32,
    pub econ_only: u32,
    pub econ_plus_mech: u32,
    pub mech_only: u32,
}

impl TransitionCounts {
    fn bump(&mut self, mode: OperatingMode) {
        match mode {
            OperatingMode::HeatingOnly => self.heating += 1,
            OperatingMode::EconOnly => self.econ_only += 1,
            OperatingMode::EconPlusMech => self.econ_plus_mech += 1,
            OperatingMode::MechOnly => self.mech_only += 1,
        }
    }

    pub fn get(&self, mode: OperatingMode) -> u32 {
        match mode {
            OperatingMode::HeatingOnly => self.heating,
            OperatingMode::EconOnly => self.econ_only,
            OperatingMode::EconPlusMech => self.econ_plus_mech,
            OperatingMode::MechOnly => self.mech_only,
        }
    }

    /// Peak entry count across the four modes.
    ///
    /// The flag never attributes hunting to a specific mode; ties are
    /// irrelevant, only the maximum matters.
    pub fn max(&self) -> u32 {
        self.heating
            .max(self.econ_only)
            .max(self.econ_plus_mech)
            .max(self.mech_only)
    }
}

/// The fc4 hunting rule
#[derive(Debug, Clone)]
pub struct HuntingRule {
    config: HuntingConfig,
    troubleshoot: bool,
}

impl HuntingRule {
    pub fn new(config: HuntingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            troubleshoot: false,
        })
    }

    /// Enable per-hour debug logging of the transition counts
    pub fn with_troubleshoot(mut self, enabled: bool) -> Self {
        self.troubleshoot = enabled;
        self
    }

    /// Classify rows and count per-hour rising edges into each mode.
    ///
    /// A row enters mode M when it classifies as M and the immediately
    /// preceding row of the series did not; the first row of the series has
    /// no predecessor and counts as an entry. Hours with no samples produce
    /// no bucket.
    pub fn hourly_transitions(
        &self,
        table: &SensorTable,
    ) -> Result<Vec<(DateTime<Utc>, TransitionCounts)>, FaultError> {
        let modes = self.config.mode.classify_table(table)?;
        let timestamps = table.timestamps();

        let mut buckets: Vec<(DateTime<Utc>, TransitionCounts)> = Vec::new();
        let mut prev: Option<OperatingMode> = None;
        for (i, &mode) in modes.iter().enumerate() {
            let hour = hour_bucket(timestamps[i]);
            // timestamps are non-decreasing, so equal buckets are contiguous
            if buckets.last().map(|(b, _)| *b) != Some(hour) {
                buckets.push((hour, TransitionCounts::default()));
            }
            if let Some(mode) = mode {
                if prev != Some(mode) {
                    if let Some((_, counts)) = buckets.last_mut() {
                        counts.bump(mode);
                    }
                }
            }
            prev = mode;
        }
        Ok(buckets)
    }
}

impl FaultCondition for HuntingRule {
    fn id(&self) -> &str {
        "fc4"
    }

    fn flag_column(&self) -> &str {
        "fc4_flag"
    }

    /// Returns the hour-cadence transition table with `fc4_flag` appended.
    fn evaluate(&self, table: &SensorTable) -> Result<SensorTable, FaultError> {
        let buckets = self.hourly_transitions(table)?;

        let timestamps = buckets.iter().map(|(hour, _)| *hour).collect();
        let mut out = SensorTable::new(timestamps)?;
        for mode in OperatingMode::ALL {
            let counts = buckets
                .iter()
                .map(|(_, c)| f64::from(c.get(mode)))
                .collect();
            out.insert_column(mode.column_name(), counts)?;
        }

        let flags: Vec<bool> = buckets
            .iter()
            .map(|(_, c)| c.max() > self.config.delta_os_max)
            .collect();
        if self.troubleshoot {
            for ((hour, counts), flag) in buckets.iter().zip(&flags) {
                debug!(%hour, ?counts, flag, "hourly operating-state changes");
            }
        }
        out.set_flag_column("fc4_flag", &flags)?;
        Ok(out)
    }
}

/// Truncate a timestamp to the start of its hour
fn hour_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build a table whose four signal columns follow the given per-row
    /// modes (None = fan off).
    fn table_from_modes(modes: &[Option<OperatingMode>], step_minutes: i64) -> SensorTable {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap();
        let ts = (0..modes.len())
            .map(|i| start + chrono::Duration::minutes(step_minutes * i as i64))
            .collect();
        let mut heating = Vec::new();
        let mut cooling = Vec::new();
        let mut fan = Vec::new();
        let mut econ = Vec::new();
        for mode in modes {
            let (h, c, f, e) = match mode {
                Some(OperatingMode::HeatingOnly) => (0.6, 0.0, 0.8, 0.20),
                Some(OperatingMode::EconOnly) => (0.0, 0.0, 0.8, 0.55),
                Some(OperatingMode::EconPlusMech) => (0.0, 0.4, 0.8, 0.55),
                Some(OperatingMode::MechOnly) => (0.0, 0.4, 0.8, 0.20),
                None => (0.0, 0.0, 0.0, 0.20),
            };
            heating.push(h);
            cooling.push(c);
            fan.push(f);
            econ.push(e);
        }
        let mut table = SensorTable::new(ts).unwrap();
        table.insert_column("heating_sig", heating).unwrap();
        table.insert_column("cooling_sig", cooling).unwrap();
        table.insert_column("supply_vfd_speed", fan).unwrap();
        table.insert_column("economizer_sig", econ).unwrap();
        table
    }

    fn rule(delta_os_max: u32) -> HuntingRule {
        HuntingRule::new(HuntingConfig {
            mode: ModeConfig::default(),
            delta_os_max,
        })
        .unwrap()
    }

    #[test]
    fn test_alternating_hour_counts_and_flags() {
        // 20 rows at 3-minute cadence inside one hour, alternating
        // heating / econ: 10 entries into each mode.
        let modes: Vec<_> = (0..20)
            .map(|i| {
                if i % 2 == 0 {
                    Some(OperatingMode::HeatingOnly)
                } else {
                    Some(OperatingMode::EconOnly)
                }
            })
            .collect();
        let table = table_from_modes(&modes, 3);

        let out = rule(7).evaluate(&table).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.column("heating_mode").unwrap(), &[10.0]);
        assert_eq!(out.column("econ_only_cooling_mode").unwrap(), &[10.0]);
        assert_eq!(out.column("mech_cooling_only_mode").unwrap(), &[0.0]);
        // 10 > 7
        assert_eq!(out.column("fc4_flag").unwrap(), &[1.0]);

        // a generous budget keeps the hour clean
        let calm = rule(10).evaluate(&table).unwrap();
        assert_eq!(calm.column("fc4_flag").unwrap(), &[0.0]);
    }

    #[test]
    fn test_steady_mode_counts_single_entry() {
        let modes = vec![Some(OperatingMode::MechOnly); 12];
        let table = table_from_modes(&modes, 5);
        let out = rule(7).evaluate(&table).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.column("mech_cooling_only_mode").unwrap(), &[1.0]);
        assert_eq!(out.column("fc4_flag").unwrap(), &[0.0]);
    }

    #[test]
    fn test_edge_across_hour_boundary_not_recounted() {
        // 30 rows at 5-minute cadence span three hours in steady econ mode;
        // only the very first row is an entry.
        let modes = vec![Some(OperatingMode::EconOnly); 30];
        let table = table_from_modes(&modes, 5);
        let out = rule(7).evaluate(&table).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(
            out.column("econ_only_cooling_mode").unwrap(),
            &[1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_unclassified_rows_break_and_reenter() {
        // econ, fan-off gap, econ again: two entries into econ
        let modes = vec![
            Some(OperatingMode::EconOnly),
            None,
            Some(OperatingMode::EconOnly),
            Some(OperatingMode::EconOnly),
        ];
        let table = table_from_modes(&modes, 5);
        let transitions = rule(7).hourly_transitions(&table).unwrap();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].1.econ_only, 2);
    }

    #[test]
    fn test_output_is_hourly_cadence() {
        let modes = vec![Some(OperatingMode::HeatingOnly); 30];
        let table = table_from_modes(&modes, 5);
        let out = rule(7).evaluate(&table).unwrap();
        let ts = out.timestamps();
        assert_eq!(ts.len(), 3);
        for t in ts {
            assert_eq!((t.minute(), t.second()), (0, 0));
        }
    }

    #[test]
    fn test_zero_budget_rejected() {
        let err = HuntingRule::new(HuntingConfig {
            mode: ModeConfig::default(),
            delta_os_max: 0,
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroMaxChanges);
    }
}
