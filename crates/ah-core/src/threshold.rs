//! Dynamic highlight threshold.

use ah_math::percentile_threshold;

use crate::aggregate::GroupAggregate;

/// Percentile threshold over the positive entries of `values`.
///
/// Returns `f64::INFINITY` when no value is positive, so nothing is
/// highlighted downstream.
pub fn estimate(values: &[f64], p: f64) -> f64 {
    percentile_threshold(values, p)
}

/// Every cell value of a chart: the subkey breakdown of each row, or the
/// row total for rows without one.
pub fn cell_values<'a>(rows: impl IntoIterator<Item = &'a GroupAggregate>) -> Vec<f64> {
    rows.into_iter()
        .flat_map(|row| {
            if row.by_subkey.is_empty() {
                vec![row.total]
            } else {
                row.by_subkey.values().copied().collect()
            }
        })
        .collect()
}

/// Threshold over the cells of `rows`.
pub fn estimate_for_rows(rows: &[GroupAggregate], p: f64) -> f64 {
    estimate(&cell_values(rows), p)
}

/// Whether a cell should be highlighted against `threshold`.
pub fn is_highlighted(value: f64, threshold: f64) -> bool {
    value > 0.0 && value >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_infinite() {
        assert_eq!(estimate(&[], 0.85), f64::INFINITY);
        assert_eq!(estimate(&[0.0, -3.0], 0.85), f64::INFINITY);
    }

    #[test]
    fn nearest_rank_index() {
        // floor((5 - 1) * 0.85) = 3
        let values = [5.0, 1.0, 0.0, 4.0, 2.0, 3.0];
        assert_eq!(estimate(&values, 0.85), 4.0);
        assert_eq!(estimate(&values, 0.0), 1.0);
        assert_eq!(estimate(&values, 1.0), 5.0);
    }

    #[test]
    fn rows_use_subkey_cells() {
        let mut row = GroupAggregate::new("A");
        row.total = 10.0;
        row.by_subkey.insert("x".into(), 7.0);
        row.by_subkey.insert("y".into(), 3.0);
        let bare = GroupAggregate {
            total: 1.0,
            ..GroupAggregate::new("B")
        };
        let mut cells = cell_values(&[row, bare]);
        cells.sort_by(f64::total_cmp);
        assert_eq!(cells, vec![1.0, 3.0, 7.0]);
    }

    #[test]
    fn nothing_highlighted_at_infinity() {
        assert!(!is_highlighted(1e12, f64::INFINITY));
        assert!(is_highlighted(4.0, 4.0));
        assert!(!is_highlighted(0.0, 0.0));
    }
}
