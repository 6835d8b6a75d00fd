//! Multi-source flood-window detection.
//!
//! Per-source unhealthy periods are merged with a sweep over windows sorted
//! by start time. Windows join the open cluster while they overlap it
//! (`start < cluster.end`; touching windows do not merge). A closed cluster
//! becomes a flood window when enough distinct sources contributed to it.

use std::collections::BTreeMap;

use ah_common::{MS_PER_MINUTE, TimeRange};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::unhealthy::SourceWindow;

/// One source's share of a flood window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceContribution {
    pub source: String,
    pub count: u64,
}

/// A detected period of system-wide alarm overload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FloodWindow {
    pub id: String,
    pub start: i64,
    pub end: i64,
    pub source_count: usize,
    pub flood_count: u64,
    pub rate_per_min: f64,
    pub sources_involved: BTreeMap<String, u64>,
    /// Sources by count descending (ties by name), bounded.
    pub top_sources: Vec<SourceContribution>,
}

impl FloodWindow {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.range().duration_ms() as f64 / MS_PER_MINUTE as f64
    }
}

/// Parameters for flood detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodParams {
    pub source_count_threshold: usize,
    pub top_sources_limit: usize,
}

impl Default for FloodParams {
    fn default() -> Self {
        Self {
            source_count_threshold: 2,
            top_sources_limit: 10,
        }
    }
}

impl From<&ah_config::FloodConfig> for FloodParams {
    fn from(config: &ah_config::FloodConfig) -> Self {
        Self {
            source_count_threshold: config.source_count_threshold,
            top_sources_limit: config.top_sources_limit,
        }
    }
}

struct Cluster<'a> {
    start: i64,
    end: i64,
    members: Vec<&'a SourceWindow>,
}

/// Detect flood windows from per-source unhealthy periods.
///
/// Windows with `end <= start` are rejected and contribute nothing.
pub fn detect(windows: &[SourceWindow], params: FloodParams) -> Vec<FloodWindow> {
    let mut valid: Vec<&SourceWindow> = windows
        .iter()
        .filter(|w| {
            let ok = w.end > w.start;
            if !ok {
                debug!(source = %w.source, start = w.start, end = w.end, "rejected malformed window");
            }
            ok
        })
        .collect();
    valid.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.end.cmp(&b.end))
            .then_with(|| a.source.cmp(&b.source))
    });

    let mut floods = Vec::new();
    let mut open: Option<Cluster> = None;
    for window in valid {
        match open.as_mut() {
            Some(cluster) if window.start < cluster.end => {
                cluster.end = cluster.end.max(window.end);
                cluster.members.push(window);
            }
            _ => {
                if let Some(done) = open.take() {
                    floods.extend(close_cluster(done, params));
                }
                open = Some(Cluster {
                    start: window.start,
                    end: window.end,
                    members: vec![window],
                });
            }
        }
    }
    if let Some(done) = open {
        floods.extend(close_cluster(done, params));
    }

    debug!(
        input = windows.len(),
        floods = floods.len(),
        threshold = params.source_count_threshold,
        "flood detection complete"
    );
    floods
}

fn close_cluster(cluster: Cluster<'_>, params: FloodParams) -> Option<FloodWindow> {
    let mut sources_involved: BTreeMap<String, u64> = BTreeMap::new();
    for member in &cluster.members {
        let total = sources_involved.entry(member.source.clone()).or_insert(0);
        *total = total.saturating_add(member.count);
    }
    if sources_involved.len() < params.source_count_threshold {
        return None;
    }

    // Counts and bounds come from caller-supplied windows; saturate rather
    // than wrap.
    let flood_count = sources_involved
        .values()
        .fold(0u64, |acc, count| acc.saturating_add(*count));
    let duration_ms = TimeRange::new(cluster.start, cluster.end).duration_ms();
    let duration_minutes = duration_ms as f64 / MS_PER_MINUTE as f64;

    let mut top_sources: Vec<SourceContribution> = sources_involved
        .iter()
        .map(|(source, &count)| SourceContribution {
            source: source.clone(),
            count,
        })
        .collect();
    top_sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    top_sources.truncate(params.top_sources_limit);

    Some(FloodWindow {
        id: format!("flood-{}", cluster.start),
        start: cluster.start,
        end: cluster.end,
        source_count: sources_involved.len(),
        flood_count,
        rate_per_min: flood_count as f64 / duration_minutes,
        sources_involved,
        top_sources,
    })
}

/// Keep windows overlapping `[start, end]` (half-open overlap test).
pub fn filter_by_range(windows: Vec<FloodWindow>, start: i64, end: i64) -> Vec<FloodWindow> {
    let range = TimeRange::new(start, end);
    windows
        .into_iter()
        .filter(|w| w.range().overlaps(&range))
        .collect()
}

/// Aggregate view over a set of flood windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FloodSummary {
    pub window_count: usize,
    pub total_activations: u64,
    pub distinct_sources: usize,
    pub peak_rate_per_min: f64,
    pub longest_window_ms: i64,
    /// Share of the observation window spent in flood, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_flood_pct: Option<f64>,
}

impl FloodSummary {
    pub fn from_windows(windows: &[FloodWindow], observed: Option<&TimeRange>) -> Self {
        let mut sources = std::collections::BTreeSet::new();
        let mut summary = FloodSummary {
            window_count: windows.len(),
            ..Default::default()
        };
        for window in windows {
            summary.total_activations = summary.total_activations.saturating_add(window.flood_count);
            summary.peak_rate_per_min = summary.peak_rate_per_min.max(window.rate_per_min);
            summary.longest_window_ms = summary.longest_window_ms.max(window.range().duration_ms());
            sources.extend(window.sources_involved.keys());
        }
        summary.distinct_sources = sources.len();
        summary.time_in_flood_pct = observed
            .filter(|range| range.duration_ms() > 0)
            .map(|range| {
                let covered = windows
                    .iter()
                    .map(|w| w.range().clamp_to(range).duration_ms().max(0))
                    .fold(0i64, i64::saturating_add);
                (covered as f64 / range.duration_ms() as f64 * 100.0).min(100.0)
            });
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T10: i64 = 10 * 60 * MS_PER_MINUTE;

    fn at(minutes: i64) -> i64 {
        T10 + minutes * MS_PER_MINUTE
    }

    #[test]
    fn empty_input() {
        assert!(detect(&[], FloodParams::default()).is_empty());
    }

    #[test]
    fn merges_overlapping_sources() {
        let windows = vec![
            SourceWindow::new("X", at(0), at(10), 6),
            SourceWindow::new("Y", at(5), at(15), 4),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(floods.len(), 1);
        let f = &floods[0];
        assert_eq!((f.start, f.end), (at(0), at(15)));
        assert_eq!(f.source_count, 2);
        assert_eq!(f.flood_count, 10);
        assert!((f.rate_per_min - 10.0 / 15.0).abs() < 1e-9);
        assert_eq!(f.top_sources[0].source, "X");
    }

    #[test]
    fn touching_windows_do_not_merge() {
        let windows = vec![
            SourceWindow::new("X", at(0), at(10), 6),
            SourceWindow::new("Y", at(10), at(20), 4),
        ];
        assert!(detect(&windows, FloodParams::default()).is_empty());
    }

    #[test]
    fn single_source_cluster_is_not_a_flood() {
        let windows = vec![
            SourceWindow::new("X", at(0), at(10), 6),
            SourceWindow::new("X", at(5), at(15), 6),
        ];
        assert!(detect(&windows, FloodParams::default()).is_empty());

        let params = FloodParams {
            source_count_threshold: 1,
            ..FloodParams::default()
        };
        let floods = detect(&windows, params);
        assert_eq!(floods[0].sources_involved["X"], 12);
        assert_eq!(floods[0].source_count, 1);
    }

    #[test]
    fn malformed_windows_are_rejected() {
        let windows = vec![
            SourceWindow::new("X", at(0), at(10), 6),
            SourceWindow::new("Y", at(5), at(5), 100),
            SourceWindow::new("Z", at(8), at(2), 100),
        ];
        assert!(detect(&windows, FloodParams::default()).is_empty());
    }

    #[test]
    fn extreme_bounds_saturate_duration() {
        let windows = vec![
            SourceWindow::new("X", -9_000_000_000_000_000_000, 0, 1),
            SourceWindow::new("Y", -1, 9_000_000_000_000_000_000, 1),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(floods.len(), 1);
        let f = &floods[0];
        assert_eq!(f.flood_count, 2);
        assert_eq!(f.range().duration_ms(), i64::MAX);
        assert!(f.duration_minutes() > 0.0);
        assert!(f.rate_per_min >= 0.0 && f.rate_per_min.is_finite());

        let summary = FloodSummary::from_windows(&floods, None);
        assert_eq!(summary.longest_window_ms, i64::MAX);
    }

    #[test]
    fn huge_counts_saturate_instead_of_wrapping() {
        let windows = vec![
            SourceWindow::new("X", 0, 10, u64::MAX),
            SourceWindow::new("Y", 5, 15, 1),
            SourceWindow::new("X", 12, 20, 7),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(floods.len(), 1);
        assert_eq!(floods[0].sources_involved["X"], u64::MAX);
        assert_eq!(floods[0].flood_count, u64::MAX);

        let doubled = vec![floods[0].clone(), floods[0].clone()];
        let summary = FloodSummary::from_windows(&doubled, None);
        assert_eq!(summary.total_activations, u64::MAX);
    }

    #[test]
    fn chained_overlap_forms_one_cluster() {
        let windows = vec![
            SourceWindow::new("C", at(16), at(30), 1),
            SourceWindow::new("A", at(0), at(10), 1),
            SourceWindow::new("B", at(9), at(20), 1),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(floods.len(), 1);
        assert_eq!(floods[0].end, at(30));
        assert_eq!(floods[0].source_count, 3);
    }

    #[test]
    fn top_sources_bounded_and_ordered() {
        let windows: Vec<SourceWindow> = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, s)| SourceWindow::new(*s, at(0), at(10), (i as u64 % 2) + 1))
            .collect();
        let params = FloodParams {
            source_count_threshold: 2,
            top_sources_limit: 3,
        };
        let flood = &detect(&windows, params)[0];
        let order: Vec<&str> = flood.top_sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a"]);
        assert_eq!(flood.sources_involved.len(), 4);
    }

    #[test]
    fn range_filter_uses_half_open_overlap() {
        let windows = vec![
            SourceWindow::new("X", at(0), at(10), 1),
            SourceWindow::new("Y", at(5), at(10), 1),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(filter_by_range(floods.clone(), at(10), at(20)).len(), 0);
        assert_eq!(filter_by_range(floods, at(9), at(20)).len(), 1);
    }

    #[test]
    fn summary_totals() {
        let windows = vec![
            SourceWindow::new("X", at(0), at(10), 6),
            SourceWindow::new("Y", at(5), at(15), 4),
            SourceWindow::new("X", at(30), at(40), 2),
            SourceWindow::new("Z", at(35), at(40), 8),
        ];
        let floods = detect(&windows, FloodParams::default());
        let observed = TimeRange::new(at(0), at(60));
        let summary = FloodSummary::from_windows(&floods, Some(&observed));
        assert_eq!(summary.window_count, 2);
        assert_eq!(summary.total_activations, 20);
        assert_eq!(summary.distinct_sources, 3);
        assert_eq!(summary.longest_window_ms, 15 * MS_PER_MINUTE);
        assert!((summary.peak_rate_per_min - 1.0).abs() < 1e-9);
        assert!((summary.time_in_flood_pct.unwrap() - 25.0 / 60.0 * 100.0).abs() < 1e-9);
    }
}
