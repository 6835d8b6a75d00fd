//! Percentile thresholds over aggregated alarm counts.
//!
//! All threshold math in the engine goes through this module so that the
//! ordering guarantees (a higher percentile never yields a lower threshold)
//! hold in exactly one place.

use std::cmp::Ordering;

/// Default percentile used for highlighting outlier cells.
pub const DEFAULT_PERCENTILE: f64 = 0.85;

/// Clamp a percentile into `[0, 1]`. NaN maps to 0.
pub fn clamp_percentile(p: f64) -> f64 {
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// Keep finite values strictly greater than zero, sorted ascending.
pub fn positive_sorted(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Index into a sorted slice of length `n` for percentile `p`: `floor((n-1) * p)`.
///
/// Returns `None` for `n == 0`.
pub fn percentile_index(n: usize, p: f64) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let p = clamp_percentile(p);
    let idx = ((n - 1) as f64 * p).floor() as usize;
    Some(idx.min(n - 1))
}

/// Percentile of an already sorted (ascending) slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    percentile_index(sorted.len(), p).map(|i| sorted[i])
}

/// Dynamic highlighting threshold over all non-zero values.
///
/// Returns `+inf` when nothing is positive, meaning "highlight nothing".
pub fn percentile_threshold(values: &[f64], p: f64) -> f64 {
    let sorted = positive_sorted(values);
    percentile_sorted(&sorted, p).unwrap_or(f64::INFINITY)
}
