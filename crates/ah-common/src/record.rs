//! Alarm activation records.
//!
//! `RawActivationRecord` is the wire shape. Its timestamp and weight fields
//! are loosely typed so that one malformed field degrades that record
//! instead of failing the batch. `ActivationRecord` is the resolved form:
//! every fallback chain is applied exactly once, here.
//!
//! Precedence:
//! - weight: `flood_count`, then `hits`, then `0`
//! - ordering timestamp: `peak_window_start`, then `event_time`, then `bin_end`

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::time::parse_timestamp_value;

/// One activation record as supplied by the data fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawActivationRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// ISO-8601 string or epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_window_start: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_window_end: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_end: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flood_count: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits: Option<Value>,
}

/// Resolved activation record. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub source: String,
    pub location_tag: Option<String>,
    pub condition: Option<String>,
    pub priority: Option<String>,
    pub event_time: Option<i64>,
    pub peak_window_start: Option<i64>,
    pub peak_window_end: Option<i64>,
    pub bin_end: Option<i64>,
    /// `flood_count ?? hits ?? 0`, never negative.
    pub weight: f64,
}

impl ActivationRecord {
    /// Convenience constructor used heavily by tests and the fuzz targets.
    pub fn new(source: impl Into<String>, event_time: Option<i64>, weight: f64) -> Self {
        Self {
            source: source.into(),
            event_time,
            weight: sanitize_weight(weight),
            ..Self::default()
        }
    }

    pub fn from_raw(raw: RawActivationRecord) -> Self {
        let weight = raw
            .flood_count
            .as_ref()
            .and_then(parse_weight_value)
            .or_else(|| raw.hits.as_ref().and_then(parse_weight_value))
            .map(sanitize_weight)
            .unwrap_or(0.0);

        Self {
            source: raw.source.trim().to_string(),
            location_tag: non_blank(raw.location_tag),
            condition: non_blank(raw.condition),
            priority: non_blank(raw.priority),
            event_time: raw.event_time.as_ref().and_then(parse_timestamp_value),
            peak_window_start: raw.peak_window_start.as_ref().and_then(parse_timestamp_value),
            peak_window_end: raw.peak_window_end.as_ref().and_then(parse_timestamp_value),
            bin_end: raw.bin_end.as_ref().and_then(parse_timestamp_value),
            weight,
        }
    }

    /// Best available timestamp for ordering and anchoring.
    pub fn order_ts(&self) -> Option<i64> {
        self.peak_window_start.or(self.event_time).or(self.bin_end)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_tag = Some(location.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_peak_window(mut self, start: i64, end: i64) -> Self {
        self.peak_window_start = Some(start);
        self.peak_window_end = Some(end);
        self
    }
}

/// Counts gathered while resolving a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IngestStats {
    pub total: usize,
    /// Records with no parseable timestamp; they still count toward totals.
    pub without_timestamp: usize,
}

/// Resolve a batch of raw records.
pub fn ingest(raws: impl IntoIterator<Item = RawActivationRecord>) -> (Vec<ActivationRecord>, IngestStats) {
    let mut stats = IngestStats::default();
    let records: Vec<ActivationRecord> = raws
        .into_iter()
        .map(|raw| {
            let record = ActivationRecord::from_raw(raw);
            stats.total += 1;
            if record.order_ts().is_none() {
                trace!(source = %record.source, "record has no usable timestamp");
                stats.without_timestamp += 1;
            }
            record
        })
        .collect();
    (records, stats)
}

fn parse_weight_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn sanitize_weight(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
