//! Engine configuration types.
//!
//! Every tunable the analytics components read is a named field here;
//! nothing is a module-level constant. All sections default independently,
//! so a config file only needs the fields it changes.

use std::collections::BTreeMap;

use ah_common::{GroupKey, SortMode, TimeRange, WindowMode, MS_PER_MINUTE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    pub schema_version: String,
    pub window: WindowConfig,
    pub top_k: TopKConfig,
    pub severity: SeverityConfig,
    pub risk: RiskConfig,
    pub flood: FloodConfig,
    pub bad_actor: BadActorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            window: WindowConfig::default(),
            top_k: TopKConfig::default(),
            severity: SeverityConfig::default(),
            risk: RiskConfig::default(),
            flood: FloodConfig::default(),
            bad_actor: BadActorConfig::default(),
        }
    }
}

/// Observation window selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WindowConfig {
    pub mode: WindowMode,
    /// Lookback from the anchor, in milliseconds.
    pub lookback_ms: i64,
    /// Optional outer bounds the window is clamped into.
    pub domain: Option<TimeRange>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            mode: WindowMode::Peak,
            lookback_ms: 60 * MS_PER_MINUTE,
            domain: None,
        }
    }
}

/// Top-K row reduction and inner-dimension folding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TopKConfig {
    /// Maximum number of rows kept.
    pub row_limit: usize,
    /// Maximum distinct inner keys (`L`); the rest fold into "Other".
    pub inner_limit: usize,
    pub sort: SortMode,
    /// Row dimension.
    pub group_by: GroupKey,
    /// Inner (stacked) dimension.
    pub inner_by: GroupKey,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self {
            row_limit: 10,
            inner_limit: 10,
            sort: SortMode::Total,
            group_by: GroupKey::Location,
            inner_by: GroupKey::Condition,
        }
    }
}

/// Highlight threshold estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SeverityConfig {
    pub percentile: f64,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            percentile: ah_math::DEFAULT_PERCENTILE,
        }
    }
}

/// Frequency/severity blend. Should sum to 1 but this is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiskWeights {
    pub freq: f64,
    pub sev: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self { freq: 0.3, sev: 0.7 }
    }
}

/// Visual magnitude mapping for ranked entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MagnitudeConfig {
    pub min: f64,
    pub max: f64,
    /// Up to this many entities the mapping is linear; above it, square-root.
    pub linear_max_items: usize,
    /// Entities with a normalized score below this get the floor boost.
    pub floor_cutoff: f64,
    /// Minimum magnitude guaranteed to boosted entities.
    pub floor_magnitude: f64,
}

impl Default for MagnitudeConfig {
    fn default() -> Self {
        Self {
            min: 12.0,
            max: 48.0,
            linear_max_items: 10,
            floor_cutoff: 10.0,
            floor_magnitude: 16.0,
        }
    }
}

/// Maps priority strings to a severity multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PriorityScale {
    /// Lower-cased priority name → severity.
    pub levels: BTreeMap<String, f64>,
    /// Severity for missing or unlisted priorities.
    pub default_severity: f64,
}

impl Default for PriorityScale {
    fn default() -> Self {
        let levels = [
            ("critical", 4.0),
            ("emergency", 4.0),
            ("urgent", 4.0),
            ("high", 3.0),
            ("medium", 2.0),
            ("low", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            levels,
            default_severity: 1.0,
        }
    }
}

impl PriorityScale {
    pub fn severity(&self, priority: Option<&str>) -> f64 {
        priority
            .map(|p| p.trim().to_lowercase())
            .and_then(|p| self.levels.get(&p).copied())
            .unwrap_or(self.default_severity)
    }
}

/// Composite risk scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiskConfig {
    pub weights: RiskWeights,
    /// Maximum ranked entities returned.
    pub limit: usize,
    pub magnitude: MagnitudeConfig,
    pub priority_scale: PriorityScale,
    /// Entity dimension.
    pub group_by: GroupKey,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            limit: 50,
            magnitude: MagnitudeConfig::default(),
            priority_scale: PriorityScale::default(),
            group_by: GroupKey::Source,
        }
    }
}

/// Flood-window detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FloodConfig {
    /// Length of the per-source sliding window.
    pub window_minutes: u64,
    /// Activations within one window that make a source unhealthy.
    pub activation_threshold: usize,
    /// Distinct unhealthy sources needed for a flood.
    pub source_count_threshold: usize,
    /// Bound on `top_sources` per flood window.
    pub top_sources_limit: usize,
    /// Keep only floods overlapping the selected observation window.
    pub filter_to_window: bool,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            window_minutes: 10,
            activation_threshold: 10,
            source_count_threshold: 2,
            top_sources_limit: 10,
            filter_to_window: true,
        }
    }
}

impl FloodConfig {
    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window_minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(MS_PER_MINUTE)
    }
}

/// Bad actor ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BadActorConfig {
    /// Include synthetic/system sources.
    pub include_system: bool,
    /// Optional cap on ranked sources.
    pub limit: Option<usize>,
}

impl Default for BadActorConfig {
    fn default() -> Self {
        Self {
            include_system: false,
            limit: Some(25),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_knobs() {
        let c = EngineConfig::default();
        assert_eq!(c.severity.percentile, 0.85);
        assert_eq!(c.risk.weights, RiskWeights { freq: 0.3, sev: 0.7 });
        assert_eq!(c.flood.window_minutes, 10);
        assert_eq!(c.flood.source_count_threshold, 2);
        assert_eq!(c.top_k.inner_limit, 10);
        assert!(!c.bad_actor.include_system);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: EngineConfig =
            serde_json::from_str(r#"{"severity": {"percentile": 0.9}, "flood": {"window_minutes": 5}}"#)
                .unwrap();
        assert_eq!(c.severity.percentile, 0.9);
        assert_eq!(c.flood.window_minutes, 5);
        assert_eq!(c.flood.source_count_threshold, 2);
        assert_eq!(c.top_k, TopKConfig::default());
    }

    #[test]
    fn oversized_flood_window_clamps_instead_of_wrapping() {
        let flood = FloodConfig {
            window_minutes: u64::MAX,
            ..FloodConfig::default()
        };
        assert_eq!(flood.window_ms(), i64::MAX);

        let flood = FloodConfig {
            window_minutes: i64::MAX as u64 + 1,
            ..FloodConfig::default()
        };
        assert!(flood.window_ms() > 0);
        assert_eq!(FloodConfig::default().window_ms(), 10 * MS_PER_MINUTE);
    }

    #[test]
    fn priority_scale_is_case_insensitive() {
        let s = PriorityScale::default();
        assert_eq!(s.severity(Some("CRITICAL")), 4.0);
        assert_eq!(s.severity(Some(" high ")), 3.0);
        assert_eq!(s.severity(Some("journal")), 1.0);
        assert_eq!(s.severity(None), 1.0);
    }
}
