//! End-to-end analysis pipeline.
//!
//! `analyze` runs every component in dependency order over one record set
//! and one configuration. It keeps no state between calls.

use ah_common::{ActivationRecord, IngestStats, TimeRange};
use ah_config::{EngineConfig, FloodConfig, RiskConfig, TopKConfig, WindowConfig};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, debug_span};

use crate::aggregate::aggregate;
use crate::bad_actor::{self, BadActor};
use crate::flood::{self, FloodParams, FloodSummary, FloodWindow};
use crate::risk::{self, RankedEntity};
use crate::threshold;
use crate::topk::{self, Remainder, TopKResult};
use crate::unhealthy::{self, SourceWindow};
use crate::window;

/// Chart-ready location × condition breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartSection {
    /// Column holding the row key.
    pub group_field: String,
    /// Dimension the stacked series come from.
    pub inner_field: String,
    pub rows: Vec<Map<String, Value>>,
    /// Series kept as their own column, largest first.
    pub inner_keys: Vec<String>,
    pub overflow_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remainder: Option<Remainder>,
    pub percentile: f64,
    /// Highlight threshold over every aggregated cell, including rows and
    /// series folded away by Top-K; `None` when no cell is positive.
    pub threshold: Option<f64>,
    /// Displayed cells at or above `threshold`.
    pub highlighted_cells: usize,
}

/// Everything computed for one record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_id: Option<String>,
    pub window_mode: String,
    /// Selected observation window; `None` means no filtering.
    pub window: Option<TimeRange>,
    pub ingest: IngestStats,
    pub records_in_window: usize,
    pub chart: ChartSection,
    pub risk: Vec<RankedEntity>,
    pub unhealthy_periods: usize,
    pub floods: Vec<FloodWindow>,
    pub flood_summary: FloodSummary,
    pub bad_actors: Vec<BadActor>,
}

impl AnalyticsReport {
    pub fn with_config_id(mut self, id: impl Into<String>) -> Self {
        self.config_id = Some(id.into());
        self
    }

    pub fn has_floods(&self) -> bool {
        !self.floods.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.ingest.total == 0
    }
}

/// Ingest statistics for already-resolved records.
pub fn stats_for(records: &[ActivationRecord]) -> IngestStats {
    IngestStats {
        total: records.len(),
        without_timestamp: records.iter().filter(|r| r.order_ts().is_none()).count(),
    }
}

/// Observation window for `records` under `config`.
pub fn select_window(records: &[ActivationRecord], config: &WindowConfig) -> Option<TimeRange> {
    let _stage = debug_span!("stage", stage = "window").entered();
    let selected = window::select(records, config.mode, config.lookback_ms, config.domain);
    debug!(mode = config.mode.as_str(), window = ?selected, "selected window");
    selected
}

/// Grouped records reduced for charting.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub result: TopKResult,
    /// Cell values of every group before rows and series were folded.
    pub cells: Vec<f64>,
}

/// Group, reduce and fold `records` for charting.
pub fn top_k(records: &[&ActivationRecord], config: &TopKConfig) -> Reduction {
    let _stage = debug_span!("stage", stage = "aggregate").entered();
    let groups = aggregate(
        records.iter().copied(),
        &config.group_by,
        Some(&config.inner_by),
    );
    debug!(groups = groups.len(), "grouped records");
    let cells = threshold::cell_values(groups.values());
    let result = topk::reduce(
        groups.into_values(),
        config.row_limit,
        config.sort,
        config.inner_limit,
    );
    Reduction { result, cells }
}

/// Chart section from a Top-K reduction.
pub fn chart_section(reduction: Reduction, config: &TopKConfig, percentile: f64) -> ChartSection {
    let Reduction { result, cells } = reduction;
    let group_field = config.group_by.field_name();
    let value = threshold::estimate(&cells, percentile);
    let threshold = value.is_finite().then_some(value);
    let highlighted_cells = threshold::cell_values(&result.rows)
        .iter()
        .filter(|v| threshold::is_highlighted(**v, value))
        .count();

    ChartSection {
        rows: result
            .rows
            .iter()
            .map(|row| row.to_chart_row(&group_field))
            .collect(),
        group_field,
        inner_field: config.inner_by.field_name(),
        inner_keys: result.inner_keys,
        overflow_key: result.overflow_key,
        remainder: result.remainder,
        percentile,
        threshold,
        highlighted_cells,
    }
}

/// Risk ranking of the entities in `records`.
pub fn risk_ranking(records: &[&ActivationRecord], config: &RiskConfig) -> Vec<RankedEntity> {
    let _stage = debug_span!("stage", stage = "score").entered();
    let entities = risk::entities_from_records(
        records.iter().copied(),
        &config.group_by,
        &config.priority_scale,
    );
    risk::score(&entities, config.weights, config.limit, &config.magnitude)
}

/// Unhealthy periods and the flood windows they form.
///
/// Classification runs over every record so that periods straddling the
/// window edge keep their full count; the resulting floods are then
/// filtered to `window` when configured.
pub fn flood_analysis(
    records: &[ActivationRecord],
    config: &FloodConfig,
    window: Option<&TimeRange>,
) -> (Vec<SourceWindow>, Vec<FloodWindow>) {
    let _stage = debug_span!("stage", stage = "flood").entered();
    let periods = unhealthy::classify(records, config.window_ms(), config.activation_threshold);
    let mut floods = flood::detect(&periods, FloodParams::from(config));
    if let (true, Some(range)) = (config.filter_to_window, window) {
        floods = flood::filter_by_range(floods, range.start, range.end);
    }
    debug!(periods = periods.len(), floods = floods.len(), "flood analysis");
    (periods, floods)
}

/// Run the full pipeline.
pub fn analyze(records: &[ActivationRecord], config: &EngineConfig) -> AnalyticsReport {
    let ingest = stats_for(records);
    let selected = select_window(records, &config.window);
    let in_window = window::filter_records(records, selected.as_ref());

    let chart = chart_section(
        top_k(&in_window, &config.top_k),
        &config.top_k,
        config.severity.percentile,
    );
    let risk = risk_ranking(&in_window, &config.risk);
    let (periods, floods) = flood_analysis(records, &config.flood, selected.as_ref());

    let bad_actors = {
        let _stage = debug_span!("stage", stage = "rank").entered();
        bad_actor::rank(
            &floods,
            config.bad_actor.include_system,
            config.bad_actor.limit,
        )
    };
    let flood_summary = FloodSummary::from_windows(&floods, selected.as_ref());

    AnalyticsReport {
        schema_version: ah_common::SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        config_id: None,
        window_mode: config.window.mode.as_str().to_string(),
        window: selected,
        ingest,
        records_in_window: in_window.len(),
        chart,
        risk,
        unhealthy_periods: periods.len(),
        floods,
        flood_summary,
        bad_actors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_common::{WindowMode, MS_PER_MINUTE};

    fn burst(source: &str, location: &str, start: i64, n: usize) -> Vec<ActivationRecord> {
        (0..n)
            .map(|i| {
                ActivationRecord::new(source, Some(start + i as i64 * 30_000), 1.0)
                    .with_location(location)
                    .with_condition("HI")
                    .with_priority("high")
            })
            .collect()
    }

    #[test]
    fn empty_input_report() {
        let report = analyze(&[], &EngineConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.window, None);
        assert!(report.chart.rows.is_empty());
        assert_eq!(report.chart.threshold, None);
        assert!(report.risk.is_empty());
        assert!(!report.has_floods());
        assert_eq!(report.flood_summary, FloodSummary::default());
    }

    #[test]
    fn two_bursting_sources_flood() {
        let mut records = burst("FI-1", "Boiler", 0, 12);
        records.extend(burst("FI-2", "Kiln", 60_000, 12));
        let mut config = EngineConfig::default();
        config.window.mode = WindowMode::All;

        let report = analyze(&records, &config);
        assert_eq!(report.ingest.total, 24);
        assert_eq!(report.records_in_window, 24);
        assert_eq!(report.floods.len(), 1);
        assert_eq!(report.floods[0].source_count, 2);
        assert_eq!(report.bad_actors.len(), 2);
        assert_eq!(report.chart.rows.len(), 2);
        assert_eq!(report.risk.len(), 2);
        assert_eq!(report.risk[0].normalized_score, 100.0);
    }

    #[test]
    fn floods_outside_window_are_filtered() {
        let mut records = burst("FI-1", "Boiler", 0, 12);
        records.extend(burst("FI-2", "Kiln", 0, 12));
        let late = 10 * 60 * MS_PER_MINUTE;
        records.push(ActivationRecord::new("FI-3", Some(late), 1.0));

        let mut config = EngineConfig::default();
        config.window.mode = WindowMode::Recent;
        config.window.lookback_ms = MS_PER_MINUTE;

        let report = analyze(&records, &config);
        assert_eq!(report.window, Some(TimeRange::new(late - MS_PER_MINUTE, late)));
        assert_eq!(report.records_in_window, 1);
        assert_eq!(report.unhealthy_periods, 2);
        assert!(report.floods.is_empty());

        config.flood.filter_to_window = false;
        assert_eq!(analyze(&records, &config).floods.len(), 1);
    }

    #[test]
    fn threshold_covers_rows_folded_by_top_k() {
        let records = vec![
            ActivationRecord::new("TI-1", Some(0), 1.0)
                .with_location("Area A")
                .with_condition("HI"),
            ActivationRecord::new("TI-2", Some(1), 2.0)
                .with_location("Area A")
                .with_condition("LO"),
            ActivationRecord::new("TI-3", Some(2), 100.0)
                .with_location("Zone Z")
                .with_condition("HI"),
        ];
        let refs: Vec<&ActivationRecord> = records.iter().collect();
        let config = TopKConfig {
            row_limit: 1,
            sort: ah_common::SortMode::Alphabetical,
            ..TopKConfig::default()
        };

        let reduction = top_k(&refs, &config);
        assert_eq!(reduction.result.rows.len(), 1);
        assert_eq!(reduction.cells.len(), 3);

        let section = chart_section(reduction, &config, 1.0);
        assert_eq!(section.threshold, Some(100.0));
        assert_eq!(section.highlighted_cells, 0);
    }
}
