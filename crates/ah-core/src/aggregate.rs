//! Group aggregation.
//!
//! Records are grouped by a primary key and their weights summed. When a
//! secondary key is given, each group also carries a per-subkey breakdown
//! whose values sum to the group total.

use std::collections::BTreeMap;

use ah_common::{ActivationRecord, KeyFn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// Accumulated totals for one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupAggregate {
    pub key: String,
    pub total: f64,
    /// Latest contributing timestamp (epoch ms). `None` when no
    /// contributing record had one.
    pub latest_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_subkey: BTreeMap<String, f64>,
}

impl GroupAggregate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            total: 0.0,
            latest_ts: None,
            by_subkey: BTreeMap::new(),
        }
    }

    fn absorb(&mut self, record: &ActivationRecord, subkey: Option<String>) {
        self.total += record.weight;
        if let Some(ts) = record.order_ts() {
            self.latest_ts = Some(self.latest_ts.map_or(ts, |cur| cur.max(ts)));
        }
        if let Some(subkey) = subkey {
            *self.by_subkey.entry(subkey).or_insert(0.0) += record.weight;
        }
    }

    /// Flatten into a chart-ready row:
    /// `{ <key_field>: key, total, latestTs, <subkey>: value, ... }`.
    ///
    /// Subkeys that collide with `key_field`, `total` or `latestTs` are
    /// shadowed by those columns.
    pub fn to_chart_row(&self, key_field: &str) -> Map<String, Value> {
        let mut row = Map::new();
        for (subkey, value) in &self.by_subkey {
            row.insert(subkey.clone(), Value::from(*value));
        }
        row.insert(key_field.to_string(), Value::from(self.key.clone()));
        row.insert("total".to_string(), Value::from(self.total));
        row.insert(
            "latestTs".to_string(),
            self.latest_ts.map_or(Value::Null, Value::from),
        );
        row
    }
}

/// Group `records` by `primary`, optionally breaking each group down by
/// `secondary`.
pub fn aggregate<'a, I>(
    records: I,
    primary: &dyn KeyFn,
    secondary: Option<&dyn KeyFn>,
) -> BTreeMap<String, GroupAggregate>
where
    I: IntoIterator<Item = &'a ActivationRecord>,
{
    let mut groups: BTreeMap<String, GroupAggregate> = BTreeMap::new();
    let mut seen = 0usize;

    for record in records {
        seen += 1;
        let key = primary.key(record);
        let subkey = secondary.map(|f| f.key(record));
        groups
            .entry(key)
            .or_insert_with_key(|k| GroupAggregate::new(k.clone()))
            .absorb(record, subkey);
    }

    trace!(records = seen, groups = groups.len(), "aggregated records");
    groups
}

/// Sum of every group total.
pub fn grand_total(groups: &BTreeMap<String, GroupAggregate>) -> f64 {
    groups.values().map(|g| g.total).sum()
}
