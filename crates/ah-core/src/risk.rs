//! Composite frequency/severity risk scoring.
//!
//! `composite = freq * frequency_count + sev * severity_sum`, normalized
//! against the largest composite onto `[0, 100]` and mapped to a bounded
//! visual magnitude for word-cloud style rendering.

use std::collections::BTreeMap;

use ah_common::{ActivationRecord, KeyFn};
use ah_config::{MagnitudeConfig, PriorityScale, RiskWeights};
use ah_math::{finite_max, normalize_to_percent, Span};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-entity scoring input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskInput {
    pub key: String,
    pub frequency_count: f64,
    pub severity_sum: f64,
}

impl RiskInput {
    pub fn new(key: impl Into<String>, frequency_count: f64, severity_sum: f64) -> Self {
        Self {
            key: key.into(),
            frequency_count,
            severity_sum,
        }
    }
}

/// A scored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntity {
    pub key: String,
    pub frequency_count: f64,
    pub severity_sum: f64,
    pub composite_score: f64,
    /// `composite / max(composite) * 100`, or 0 when the max is 0.
    pub normalized_score: f64,
    pub visual_magnitude: f64,
}

/// Score, sort (composite desc, key asc) and truncate to `limit`.
///
/// The magnitude curve is chosen from the number of entities scored, not
/// the number returned.
pub fn score(
    entities: &[RiskInput],
    weights: RiskWeights,
    limit: usize,
    magnitude: &MagnitudeConfig,
) -> Vec<RankedEntity> {
    if entities.is_empty() {
        return Vec::new();
    }

    let composites: Vec<f64> = entities
        .iter()
        .map(|e| composite_score(e, weights))
        .collect();
    let max = finite_max(composites.iter().copied()).unwrap_or(0.0);
    let count = entities.len();

    let mut ranked: Vec<RankedEntity> = entities
        .iter()
        .zip(composites)
        .map(|(entity, composite)| {
            let normalized = normalize_to_percent(composite, max);
            RankedEntity {
                key: entity.key.clone(),
                frequency_count: entity.frequency_count,
                severity_sum: entity.severity_sum,
                composite_score: composite,
                normalized_score: normalized,
                visual_magnitude: visual_magnitude(normalized, count, magnitude),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.composite_score
            .total_cmp(&a.composite_score)
            .then_with(|| a.key.cmp(&b.key))
    });
    ranked.truncate(limit);

    debug!(entities = count, returned = ranked.len(), max_composite = max, "scored entities");
    ranked
}

pub fn composite_score(entity: &RiskInput, weights: RiskWeights) -> f64 {
    let composite = weights.freq * entity.frequency_count + weights.sev * entity.severity_sum;
    if composite.is_finite() {
        composite
    } else {
        0.0
    }
}

/// Map a normalized score (0-100) onto `[magnitude.min, magnitude.max]`.
///
/// Linear for small sets; square-root above `linear_max_items`, which
/// lifts the low end. Scores under `floor_cutoff` never drop below
/// `floor_magnitude`.
pub fn visual_magnitude(normalized: f64, item_count: usize, magnitude: &MagnitudeConfig) -> f64 {
    let t = (normalized / 100.0).clamp(0.0, 1.0);
    let curved = if item_count <= magnitude.linear_max_items {
        t
    } else {
        t.sqrt()
    };
    let value = Span::new(magnitude.min, magnitude.max).lerp(curved);
    if normalized < magnitude.floor_cutoff {
        value.max(magnitude.floor_magnitude)
    } else {
        value
    }
}

/// Build scoring inputs from records: frequency is the summed weight,
/// severity the summed `weight * priority severity`.
pub fn entities_from_records<'a, I>(
    records: I,
    key: &dyn KeyFn,
    scale: &PriorityScale,
) -> Vec<RiskInput>
where
    I: IntoIterator<Item = &'a ActivationRecord>,
{
    let mut acc: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for record in records {
        let severity = scale.severity(record.priority.as_deref());
        let entry = acc.entry(key.key(record)).or_insert((0.0, 0.0));
        entry.0 += record.weight;
        entry.1 += record.weight * severity;
    }
    acc.into_iter()
        .map(|(k, (freq, sev))| RiskInput::new(k, freq, sev))
        .collect()
}
