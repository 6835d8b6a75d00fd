//! Per-source unhealthy-period classification.
//!
//! A source is unhealthy over `[t, t + window)` when at least
//! `activation_threshold` of its activations fall inside, for some
//! activation time `t`. Overlapping unhealthy windows of one source merge
//! into a single period. Every record counts as one activation.

use std::collections::BTreeMap;

use ah_common::{ActivationRecord, GroupKey, KeyFn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// An unhealthy period of one source. Input to flood detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceWindow {
    pub source: String,
    pub start: i64,
    pub end: i64,
    /// Activations inside the period.
    pub count: u64,
}

impl SourceWindow {
    pub fn new(source: impl Into<String>, start: i64, end: i64, count: u64) -> Self {
        Self {
            source: source.into(),
            start,
            end,
            count,
        }
    }
}

/// Activation time of a record: `event_time`, else its ordering timestamp.
fn activation_time(record: &ActivationRecord) -> Option<i64> {
    record.event_time.or_else(|| record.order_ts())
}

/// Classify unhealthy periods for every source in `records`.
///
/// Output is sorted by `(start, source)`. Records without a timestamp are
/// ignored.
pub fn classify<'a, I>(records: I, window_ms: i64, activation_threshold: usize) -> Vec<SourceWindow>
where
    I: IntoIterator<Item = &'a ActivationRecord>,
{
    if window_ms <= 0 {
        return Vec::new();
    }
    let threshold = activation_threshold.max(1);

    let mut by_source: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for record in records {
        if let Some(ts) = activation_time(record) {
            by_source
                .entry(GroupKey::Source.key(record))
                .or_default()
                .push(ts);
        }
    }

    let mut out = Vec::new();
    for (source, mut times) in by_source {
        times.sort_unstable();
        let periods = source_periods(&times, window_ms, threshold);
        trace!(source = %source, activations = times.len(), periods = periods.len(), "classified source");
        out.extend(
            periods
                .into_iter()
                .map(|(start, end, count)| SourceWindow::new(source.clone(), start, end, count)),
        );
    }

    out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.source.cmp(&b.source)));
    out
}

/// Unhealthy periods over sorted activation times as `(start, end, count)`.
fn source_periods(times: &[i64], window_ms: i64, threshold: usize) -> Vec<(i64, i64, u64)> {
    let mut periods = Vec::new();
    // Current merged period: first activation index, end, exclusive index.
    let mut current: Option<(usize, i64, usize)> = None;
    let mut hi = 0usize;

    for (lo, &start) in times.iter().enumerate() {
        let end = start.saturating_add(window_ms);
        hi = hi.max(lo);
        while hi < times.len() && times[hi] < end {
            hi += 1;
        }
        if hi - lo < threshold {
            continue;
        }
        current = match current {
            Some((first, cur_end, _)) if start < cur_end => Some((first, cur_end.max(end), hi)),
            Some((first, cur_end, last)) => {
                periods.push((times[first], cur_end, (last - first) as u64));
                Some((lo, end, hi))
            }
            None => Some((lo, end, hi)),
        };
    }
    if let Some((first, end, last)) = current {
        periods.push((times[first], end, (last - first) as u64));
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_common::MS_PER_MINUTE;

    fn burst(source: &str, start: i64, n: usize, step: i64) -> Vec<ActivationRecord> {
        (0..n)
            .map(|i| ActivationRecord::new(source, Some(start + i as i64 * step), 1.0))
            .collect()
    }

    #[test]
    fn below_threshold_is_healthy() {
        let records = burst("LI-1", 0, 4, MS_PER_MINUTE);
        assert!(classify(&records, 10 * MS_PER_MINUTE, 5).is_empty());
    }

    #[test]
    fn dense_burst_is_one_period() {
        let records = burst("LI-1", 0, 12, MS_PER_MINUTE);
        let periods = classify(&records, 10 * MS_PER_MINUTE, 10);
        assert_eq!(periods.len(), 1);
        let p = &periods[0];
        assert_eq!(p.start, 0);
        // Anchors at 0, 1 and 2 minutes qualify; last window ends at 12 min.
        assert_eq!(p.end, 12 * MS_PER_MINUTE);
        assert_eq!(p.count, 12);
    }

    #[test]
    fn separate_bursts_stay_separate() {
        let mut records = burst("LI-1", 0, 3, 1000);
        records.extend(burst("LI-1", 60 * MS_PER_MINUTE, 3, 1000));
        let periods = classify(&records, MS_PER_MINUTE, 3);
        assert_eq!(periods.len(), 2);
        assert!(periods.iter().all(|p| p.count == 3));
    }

    #[test]
    fn output_sorted_by_start_then_source() {
        let mut records = burst("B", 0, 2, 1);
        records.extend(burst("A", 0, 2, 1));
        records.extend(burst("C", -100, 2, 1));
        let sources: Vec<String> = classify(&records, 10, 2)
            .into_iter()
            .map(|p| p.source)
            .collect();
        assert_eq!(sources, vec!["C", "A", "B"]);
    }

    #[test]
    fn untimestamped_and_nonpositive_window() {
        let records = vec![ActivationRecord::new("X", None, 1.0); 20];
        assert!(classify(&records, MS_PER_MINUTE, 1).is_empty());
        let records = burst("X", 0, 5, 1);
        assert!(classify(&records, 0, 1).is_empty());
    }

    #[test]
    fn oversized_configured_window_still_classifies() {
        let flood = ah_config::FloodConfig {
            window_minutes: u64::MAX,
            ..ah_config::FloodConfig::default()
        };
        let records = burst("X", 0, 5, MS_PER_MINUTE);
        let periods = classify(&records, flood.window_ms(), 5);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].count, 5);
        assert_eq!(periods[0].end, i64::MAX);
    }
}
