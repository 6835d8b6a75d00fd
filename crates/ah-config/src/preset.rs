//! Configuration presets for common dashboards.
//!
//! Provides pre-built configurations for:
//! - Default: the documented defaults
//! - Sensitive: lower flood thresholds, more highlighting
//! - Conservative: only pronounced floods and outliers surface
//! - Console: compact rankings for overview pages

use std::fmt;

use ah_common::Error;
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Documented defaults.
    Default,
    /// Early warning: floods with fewer activations, lower highlight bar.
    Sensitive,
    /// Only pronounced floods and outliers.
    Conservative,
    /// Compact output for overview dashboards.
    Console,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Default,
        PresetName::Sensitive,
        PresetName::Conservative,
        PresetName::Console,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Sensitive => "sensitive",
            PresetName::Conservative => "conservative",
            PresetName::Console => "console",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "default" | "standard" => Some(PresetName::Default),
            "sensitive" | "early-warning" => Some(PresetName::Sensitive),
            "conservative" | "strict" => Some(PresetName::Conservative),
            "console" | "overview" | "compact" => Some(PresetName::Console),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Default => "Documented defaults: p85 highlight, 10 min floods, 2 sources",
            PresetName::Sensitive => "Lower flood thresholds and p75 highlighting for early warning",
            PresetName::Conservative => "Higher flood thresholds and p95 highlighting",
            PresetName::Console => "Top 5 rows, 6 inner keys, 20 ranked entities",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| Error::UnknownPreset(s.to_string()))
    }
}

/// Get the engine configuration for a preset.
pub fn get_preset(name: PresetName) -> EngineConfig {
    match name {
        PresetName::Default => EngineConfig::default(),
        PresetName::Sensitive => sensitive_preset(),
        PresetName::Conservative => conservative_preset(),
        PresetName::Console => console_preset(),
    }
}

fn sensitive_preset() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.severity.percentile = 0.75;
    config.flood.activation_threshold = 5;
    config.flood.source_count_threshold = 2;
    config.risk.magnitude.floor_cutoff = 20.0;
    config.bad_actor.limit = Some(50);
    config
}

fn conservative_preset() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.severity.percentile = 0.95;
    config.flood.activation_threshold = 15;
    config.flood.source_count_threshold = 3;
    config.bad_actor.limit = Some(10);
    config
}

fn console_preset() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.top_k.row_limit = 5;
    config.top_k.inner_limit = 6;
    config.risk.limit = 20;
    config.flood.top_sources_limit = 5;
    config.bad_actor.limit = Some(10);
    config
}

/// Information about a preset for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub description: String,
    pub percentile: f64,
    pub activation_threshold: usize,
    pub source_count_threshold: usize,
    pub row_limit: usize,
    pub inner_limit: usize,
}

impl PresetInfo {
    /// Create info from a preset.
    pub fn from_preset(name: PresetName) -> Self {
        let config = get_preset(name);
        Self {
            name: name.as_str().to_string(),
            description: name.description().to_string(),
            percentile: config.severity.percentile,
            activation_threshold: config.flood.activation_threshold,
            source_count_threshold: config.flood.source_count_threshold,
            row_limit: config.top_k.row_limit,
            inner_limit: config.top_k.inner_limit,
        }
    }
}

/// List all available presets with summary information.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo::from_preset(name))
        .collect()
}
