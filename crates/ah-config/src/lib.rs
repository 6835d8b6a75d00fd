//! Alarm health engine configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for every engine knob (`EngineConfig`)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation (percentile range, weight sanity, limits)
//! - Named presets for common dashboards
//! - Config snapshots for report provenance

pub mod engine;
pub mod load;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use engine::{
    BadActorConfig, EngineConfig, FloodConfig, MagnitudeConfig, PriorityScale, RiskConfig,
    RiskWeights, SeverityConfig, TopKConfig, WindowConfig,
};
pub use load::{load_config, load_config_from_file, ConfigError, ConfigOptions, ResolvedConfig};
pub use preset::{get_preset, list_presets, PresetInfo, PresetName};
pub use resolve::{resolve_config_path, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
