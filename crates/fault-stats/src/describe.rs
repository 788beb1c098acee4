//! Per-Column Summary Statistics

use serde::Serialize;

/// Summary statistics for a single sensor column, NaN-skipping
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnStats {
    /// Number of finite samples
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Compute statistics over a slice of values, skipping NaN.
    ///
    /// Returns the default (all zeros) when no finite samples exist.
    pub fn compute(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self::default();
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let min = finite.iter().copied().fold(f64::MAX, f64::min);
        let max = finite.iter().copied().fold(f64::MIN, f64::max);

        let mut m2 = 0.0;
        for &v in &finite {
            let d = v - mean;
            m2 += d * d;
        }
        let std_dev = (m2 / n).sqrt();

        Self {
            count: finite.len(),
            mean,
            std_dev,
            min,
            max,
        }
    }
}
