//! Configuration validation errors and semantic validation.

use thiserror::Error;

use ah_common::WindowMode;

use crate::engine::{EngineConfig, FloodConfig, MagnitudeConfig, RiskConfig, TopKConfig};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ah_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => {
                ah_common::Error::InvalidParameter { field, message }
            }
            other => ah_common::Error::Config(other.to_string()),
        }
    }
}

/// Validate an engine configuration semantically.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_window(config)?;
    validate_top_k(&config.top_k)?;

    let p = config.severity.percentile;
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ValidationError::invalid(
            "severity.percentile",
            format!("Must be in [0, 1], got {}", p),
        ));
    }

    validate_risk(&config.risk)?;
    validate_flood(&config.flood)?;

    if config.bad_actor.limit == Some(0) {
        return Err(ValidationError::invalid(
            "bad_actor.limit",
            "Must be >= 1 when set",
        ));
    }

    Ok(())
}

fn validate_window(config: &EngineConfig) -> ValidationResult<()> {
    let window = &config.window;
    if window.lookback_ms < 0 {
        return Err(ValidationError::invalid(
            "window.lookback_ms",
            format!("Must be non-negative, got {}", window.lookback_ms),
        ));
    }

    if let WindowMode::Explicit { start, end } = window.mode {
        if start >= end {
            return Err(ValidationError::invalid(
                "window.mode",
                format!("Explicit range needs start < end, got [{}, {}]", start, end),
            ));
        }
    }

    if let Some(domain) = window.domain {
        if domain.start >= domain.end {
            return Err(ValidationError::invalid(
                "window.domain",
                format!("Needs start < end, got [{}, {}]", domain.start, domain.end),
            ));
        }
    }

    Ok(())
}

fn validate_top_k(top_k: &TopKConfig) -> ValidationResult<()> {
    if top_k.row_limit == 0 {
        return Err(ValidationError::invalid("top_k.row_limit", "Must be >= 1"));
    }
    if top_k.inner_limit == 0 {
        return Err(ValidationError::invalid("top_k.inner_limit", "Must be >= 1"));
    }
    if top_k.group_by == top_k.inner_by {
        return Err(ValidationError::SemanticError(
            "top_k.group_by and top_k.inner_by must differ".to_string(),
        ));
    }
    Ok(())
}

fn validate_risk(risk: &RiskConfig) -> ValidationResult<()> {
    let w = risk.weights;
    for (field, value) in [("risk.weights.freq", w.freq), ("risk.weights.sev", w.sev)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::invalid(
                field,
                format!("Must be finite and non-negative, got {}", value),
            ));
        }
    }
    if w.freq + w.sev <= 0.0 {
        return Err(ValidationError::invalid(
            "risk.weights",
            "weights must have positive sum",
        ));
    }
    if (w.freq + w.sev - 1.0).abs() > 0.01 {
        tracing::debug!(
            freq = w.freq,
            sev = w.sev,
            "risk weights do not sum to 1; scores are still normalized"
        );
    }

    if risk.limit == 0 {
        return Err(ValidationError::invalid("risk.limit", "Must be >= 1"));
    }

    validate_magnitude(&risk.magnitude)?;

    if !risk.priority_scale.default_severity.is_finite()
        || risk.priority_scale.default_severity < 0.0
    {
        return Err(ValidationError::invalid(
            "risk.priority_scale.default_severity",
            "Must be finite and non-negative",
        ));
    }
    for (name, value) in &risk.priority_scale.levels {
        if !value.is_finite() || *value < 0.0 {
            return Err(ValidationError::invalid(
                &format!("risk.priority_scale.levels.{}", name),
                format!("Must be finite and non-negative, got {}", value),
            ));
        }
    }

    Ok(())
}

fn validate_magnitude(m: &MagnitudeConfig) -> ValidationResult<()> {
    if !m.min.is_finite() || !m.max.is_finite() || m.min >= m.max {
        return Err(ValidationError::invalid(
            "risk.magnitude",
            format!("Needs finite min < max, got [{}, {}]", m.min, m.max),
        ));
    }
    if !(0.0..=100.0).contains(&m.floor_cutoff) {
        return Err(ValidationError::invalid(
            "risk.magnitude.floor_cutoff",
            format!("Must be in [0, 100], got {}", m.floor_cutoff),
        ));
    }
    if m.floor_magnitude < m.min || m.floor_magnitude > m.max {
        return Err(ValidationError::invalid(
            "risk.magnitude.floor_magnitude",
            format!(
                "Must lie within [{}, {}], got {}",
                m.min, m.max, m.floor_magnitude
            ),
        ));
    }
    Ok(())
}

fn validate_flood(flood: &FloodConfig) -> ValidationResult<()> {
    if flood.window_minutes == 0 {
        return Err(ValidationError::invalid("flood.window_minutes", "Must be > 0"));
    }
    if flood.activation_threshold == 0 {
        return Err(ValidationError::invalid(
            "flood.activation_threshold",
            "Must be >= 1",
        ));
    }
    if flood.source_count_threshold == 0 {
        return Err(ValidationError::invalid(
            "flood.source_count_threshold",
            "Must be >= 1",
        ));
    }
    if flood.top_sources_limit == 0 {
        return Err(ValidationError::invalid(
            "flood.top_sources_limit",
            "Must be >= 1",
        ));
    }
    Ok(())
}
