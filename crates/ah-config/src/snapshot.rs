//! Configuration snapshots for report provenance.
//!
//! A snapshot captures the exact configuration a report was computed with,
//! so two reports can be compared knowing whether their knobs matched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::EngineConfig;
use crate::resolve::ConfigSource;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Where the configuration came from.
    pub source: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 of the raw file content, when loaded from a file.
    #[serde(default)]
    pub content_hash: Option<String>,

    /// SHA-256 of the effective configuration serialized as JSON.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub window_mode: String,
    pub lookback_ms: i64,
    pub percentile: f64,
    pub risk_freq_weight: f64,
    pub risk_sev_weight: f64,
    pub flood_window_minutes: u64,
    pub flood_source_count_threshold: usize,
    pub row_limit: usize,
    pub inner_limit: usize,
    pub include_system: bool,
}

impl ConfigSnapshot {
    /// Snapshot an effective configuration.
    pub fn capture(
        config: &EngineConfig,
        source: ConfigSource,
        path: Option<String>,
        content_hash: Option<String>,
    ) -> Self {
        let canonical = serde_json::to_string(config).unwrap_or_default();
        Self {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            source: source.to_string(),
            path,
            content_hash,
            config_hash: hash_content(&canonical),
            summary: summarize(config),
        }
    }

    /// Snapshot of the built-in defaults.
    pub fn defaults_only() -> Self {
        Self::capture(
            &EngineConfig::default(),
            ConfigSource::BuiltinDefault,
            None,
            None,
        )
    }

    /// Short identifier (first 12 hex chars of the config hash).
    pub fn short_id(&self) -> String {
        self.config_hash.chars().take(12).collect()
    }

    /// Whether two snapshots describe the same effective configuration.
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }
}

fn summarize(config: &EngineConfig) -> ConfigSummary {
    ConfigSummary {
        window_mode: config.window.mode.as_str().to_string(),
        lookback_ms: config.window.lookback_ms,
        percentile: config.severity.percentile,
        risk_freq_weight: config.risk.weights.freq,
        risk_sev_weight: config.risk.weights.sev,
        flood_window_minutes: config.flood.window_minutes,
        flood_source_count_threshold: config.flood.source_count_threshold,
        row_limit: config.top_k.row_limit,
        inner_limit: config.top_k.inner_limit,
        include_system: config.bad_actor.include_system,
    }
}

/// Hash content with SHA-256 and return hex string.
pub(crate) fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
