//! Flag Column Summaries

use crate::StatsError;
use chrono::Timelike;
use sensor_table::SensorTable;
use serde::Serialize;
use std::collections::HashMap;

/// Summary of one flag column over a table.
///
/// Durations are computed from timestamp deltas, so irregular sampling is
/// weighted by the actual time each row covers: a flagged row accounts for
/// the gap since the previous row, matching how the fault hours read on a
/// trend chart.
#[derive(Debug, Clone, Serialize)]
pub struct FlagSummary {
    /// Total observed time, hours
    pub total_hours: f64,
    /// Total observed time, days
    pub total_days: f64,
    /// Time with the flag raised, hours
    pub hours_in_fault: f64,
    /// Share of rows flagged, percent
    pub percent_true: f64,
    /// Share of rows clean, percent
    pub percent_false: f64,
    /// Mean of each monitored column over flagged rows (NaN when no row
    /// flagged or no finite samples)
    pub flag_true_means: HashMap<String, f64>,
    /// Count of flagged rows per hour of day
    pub hour_of_day_histogram: [u32; 24],
}

impl FlagSummary {
    /// Compute the summary for `flag_col`, averaging `monitored_cols` over
    /// the flagged rows.
    pub fn compute(
        table: &SensorTable,
        flag_col: &str,
        monitored_cols: &[&str],
    ) -> Result<Self, StatsError> {
        if table.is_empty() {
            return Err(StatsError::EmptyTable);
        }
        let flags = table.column(flag_col)?;
        let timestamps = table.timestamps();

        let mut total_ms: i64 = 0;
        let mut fault_ms: i64 = 0;
        for i in 1..timestamps.len() {
            let delta_ms = (timestamps[i] - timestamps[i - 1]).num_milliseconds();
            total_ms += delta_ms;
            if flags[i] == 1.0 {
                fault_ms += delta_ms;
            }
        }
        let total_hours = total_ms as f64 / 3_600_000.0;
        let hours_in_fault = fault_ms as f64 / 3_600_000.0;

        let flagged = flags.iter().filter(|&&f| f == 1.0).count();
        let percent_true = 100.0 * flagged as f64 / flags.len() as f64;

        let mut flag_true_means = HashMap::new();
        for &name in monitored_cols {
            let values = table.column(name)?;
            let mut sum = 0.0;
            let mut count = 0usize;
            for (v, f) in values.iter().zip(flags) {
                if *f == 1.0 && v.is_finite() {
                    sum += v;
                    count += 1;
                }
            }
            let mean = if count > 0 { sum / count as f64 } else { f64::NAN };
            flag_true_means.insert(name.to_string(), mean);
        }

        let mut hour_of_day_histogram = [0u32; 24];
        for (ts, f) in timestamps.iter().zip(flags) {
            if *f == 1.0 {
                hour_of_day_histogram[ts.hour() as usize] += 1;
            }
        }

        Ok(Self {
            total_hours,
            total_days: total_hours / 24.0,
            hours_in_fault,
            percent_true,
            percent_false: 100.0 - percent_true,
            flag_true_means,
            hour_of_day_histogram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn table_with_flags(flags: &[bool], step_minutes: i64) -> SensorTable {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();
        let ts = (0..flags.len())
            .map(|i| start + chrono::Duration::minutes(step_minutes * i as i64))
            .collect();
        let mut table = SensorTable::new(ts).unwrap();
        table.set_flag_column("fc3_flag", flags).unwrap();
        table
    }

    #[test]
    fn test_fault_hours_weight_by_delta() {
        // 5 rows at 15-minute cadence: 1 hour observed; rows 1 and 2 flagged
        // cover two 15-minute gaps.
        let mut flags = vec![false; 5];
        flags[1] = true;
        flags[2] = true;
        let table = table_with_flags(&flags, 15);
        let summary = FlagSummary::compute(&table, "fc3_flag", &[]).unwrap();
        assert!((summary.total_hours - 1.0).abs() < 1e-9);
        assert!((summary.hours_in_fault - 0.5).abs() < 1e-9);
        assert!((summary.percent_true - 40.0).abs() < 1e-9);
        assert!((summary.percent_false - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_flagged_sensor_means() {
        let mut table = table_with_flags(&[true, false, true], 5);
        table
            .insert_column("mat", vec![80.0, 60.0, 90.0])
            .unwrap();
        let summary = FlagSummary::compute(&table, "fc3_flag", &["mat"]).unwrap();
        assert!((summary.flag_true_means["mat"] - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_flagged_rows_gives_nan_mean() {
        let mut table = table_with_flags(&[false, false], 5);
        table.insert_column("mat", vec![80.0, 60.0]).unwrap();
        let summary = FlagSummary::compute(&table, "fc3_flag", &["mat"]).unwrap();
        assert!(summary.flag_true_means["mat"].is_nan());
    }

    #[test]
    fn test_hour_of_day_histogram() {
        // 3 rows an hour apart starting 10:00, all flagged
        let table = table_with_flags(&[true, true, true], 60);
        let summary = FlagSummary::compute(&table, "fc3_flag", &[]).unwrap();
        assert_eq!(summary.hour_of_day_histogram[10], 1);
        assert_eq!(summary.hour_of_day_histogram[11], 1);
        assert_eq!(summary.hour_of_day_histogram[12], 1);
        assert_eq!(summary.hour_of_day_histogram.iter().sum::<u32>(), 3);
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = SensorTable::new(Vec::new()).unwrap();
        let err = FlagSummary::compute(&table, "fc3_flag", &[]).unwrap_err();
        assert_eq!(err, StatsError::EmptyTable);
    }

    #[test]
    fn test_missing_flag_column() {
        let table = table_with_flags(&[true], 5);
        assert!(FlagSummary::compute(&table, "fc9_flag", &[]).is_err());
    }
}
