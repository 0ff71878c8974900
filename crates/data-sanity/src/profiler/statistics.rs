//! Statistical functions for column profiling.

use crate::types::NumericStats;

/// Compute descriptive statistics over the non-missing values of a numeric column.
///
/// Returns `None` for an empty slice.
pub(crate) fn compute_numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    Some(NumericStats {
        count,
        mean,
        std: calculate_std(&sorted, mean),
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.50),
        p75: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Sample standard deviation (N-1 denominator). `None` below two values.
pub(crate) fn calculate_std(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len() as f64;
    if n <= 1.0 {
        return None;
    }

    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

/// Percentile of an ascending-sorted, non-empty slice using linear
/// interpolation between the closest order statistics.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    // Clamp so interpolation between equal neighbours never drifts outside them.
    let value = sorted[lower] + (sorted[upper] - sorted[lower]) * fraction;
    value.clamp(sorted[lower], sorted[upper])
}
