//! Configuration loading.
//!
//! Files may be JSON or TOML (by extension; unknown extensions try JSON
//! first). Every loaded configuration is validated before it is returned.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::engine::EngineConfig;
use crate::preset::{get_preset, PresetName};
use crate::resolve::{resolve_config_path, ConfigSource};
use crate::snapshot::{hash_content, ConfigSnapshot};
use crate::validate::{validate_config, ValidationError};

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in config file {path}: {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in config file {path}: {source}")]
    TomlError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Semantic validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for ah_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(v) => v.into(),
            other => ah_common::Error::Config(other.to_string()),
        }
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit config file (highest priority).
    pub config_path: Option<PathBuf>,
    /// Named preset, used when no explicit file is given.
    pub preset: Option<PresetName>,
}

/// Effective configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: EngineConfig,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
    /// SHA-256 of the file content (None for presets and defaults).
    pub content_hash: Option<String>,
}

impl ResolvedConfig {
    pub fn defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            source: ConfigSource::BuiltinDefault,
            path: None,
            content_hash: None,
        }
    }

    /// Create a config snapshot for report provenance.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::capture(
            &self.config,
            self.source,
            self.path.as_ref().map(|p| p.display().to_string()),
            self.content_hash.clone(),
        )
    }
}

/// Load configuration with the standard resolution order.
///
/// 1. Explicit `--config` path (must exist)
/// 2. `--preset`
/// 3. Discovered file (env, XDG, system)
/// 4. Built-in defaults
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        let (config, hash) = load_config_from_file(path)?;
        return Ok(ResolvedConfig {
            config,
            source: ConfigSource::CliArgument,
            path: Some(path.clone()),
            content_hash: Some(hash),
        });
    }

    if let Some(preset) = options.preset {
        let config = get_preset(preset);
        validate_config(&config)?;
        debug!(preset = %preset, "using config preset");
        return Ok(ResolvedConfig {
            config,
            source: ConfigSource::Preset,
            path: None,
            content_hash: None,
        });
    }

    match resolve_config_path(None) {
        (Some(path), source) => {
            let (config, hash) = load_config_from_file(&path)?;
            debug!(path = %path.display(), source = %source, "loaded config file");
            Ok(ResolvedConfig {
                config,
                source,
                path: Some(path),
                content_hash: Some(hash),
            })
        }
        (None, _) => Ok(ResolvedConfig::defaults()),
    }
}

/// Load and validate a config file. Returns the config and the content hash.
pub fn load_config_from_file(path: &Path) -> Result<(EngineConfig, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = parse_config(path, &content)?;
    validate_config(&config)?;

    Ok((config, hash_content(&content)))
}

fn parse_config(path: &Path, content: &str) -> Result<EngineConfig, ConfigError> {
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    if is_toml {
        return toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    serde_json::from_str(content).map_err(|e| ConfigError::JsonError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_missing_file_is_not_found() {
        let options = ConfigOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.json")),
            preset: None,
        };
        assert!(matches!(
            load_config(&options),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn preset_is_used_without_file() {
        let options = ConfigOptions {
            config_path: None,
            preset: Some(PresetName::Console),
        };
        let resolved = load_config(&options).unwrap();
        assert_eq!(resolved.source, ConfigSource::Preset);
        assert_eq!(resolved.config.top_k.row_limit, 5);
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[severity]\npercentile = 0.9\n\n[flood]\nwindow_minutes = 15\n"
        )
        .unwrap();
        let (config, hash) = load_config_from_file(file.path()).unwrap();
        assert_eq!(config.severity.percentile, 0.9);
        assert_eq!(config.flood.window_minutes, 15);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"risk": {{"weights": {{"freq": -1.0, "sev": 0.5}}}}}}"#).unwrap();
        assert!(matches!(
            load_config_from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
