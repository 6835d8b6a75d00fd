//! Error types for the alarm health engine.
//!
//! Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation text for humans
//!
//! The pure analytics components never fail on "no data"; errors come from
//! configuration, record input and I/O only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for alarm health operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Engine configuration errors.
    Config,
    /// Activation record / window input errors.
    Input,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for the alarm health engine.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidParameter { field: String, message: String },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    // Input errors (20-29)
    #[error("invalid record input: {0}")]
    InvalidInput(String),

    #[error("invalid time range: start {start} is not before end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("unparseable duration: {0}")]
    InvalidDuration(String),

    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidParameter { .. } => 11,
            Error::UnknownPreset(_) => 12,
            Error::InvalidInput(_) => 20,
            Error::InvalidRange { .. } => 21,
            Error::InvalidDuration(_) => 22,
            Error::InvalidTimestamp(_) => 23,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidParameter { .. } | Error::UnknownPreset(_) => {
                ErrorCategory::Config
            }

            Error::InvalidInput(_)
            | Error::InvalidRange { .. }
            | Error::InvalidDuration(_)
            | Error::InvalidTimestamp(_) => ErrorCategory::Input,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable by the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidParameter { .. } | Error::UnknownPreset(_) => true,
            Error::InvalidInput(_) => true,
            Error::InvalidRange { .. } => true,
            Error::InvalidDuration(_) | Error::InvalidTimestamp(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidParameter { .. } => {
                "Run 'ah-core config validate' to check the engine configuration."
            }
            Error::UnknownPreset(_) => "List available presets with 'ah-core config presets'.",
            Error::InvalidInput(_) => {
                "Input must be a JSON array of activation records or one record per line."
            }
            Error::InvalidRange { .. } => "Pass --start earlier than --end.",
            Error::InvalidDuration(_) => "Durations look like 500ms, 90s, 10m, 2h or 7d.",
            Error::InvalidTimestamp(_) => {
                "Timestamps must be RFC 3339 (2024-05-01T10:00:00Z) or epoch milliseconds."
            }
            Error::Io(_) => "Check that the input file exists and is readable.",
            Error::Json(_) => "Check the JSON syntax of the input with 'jq .'.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (e.g., offending field).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidParameter { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            Error::InvalidRange { start, end } => {
                context.insert("start".to_string(), serde_json::json!(start));
                context.insert("end".to_string(), serde_json::json!(end));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_categories() {
        let cases: Vec<(Error, ErrorCategory)> = vec![
            (Error::Config("x".into()), ErrorCategory::Config),
            (Error::UnknownPreset("x".into()), ErrorCategory::Config),
            (Error::InvalidInput("x".into()), ErrorCategory::Input),
            (Error::InvalidRange { start: 2, end: 1 }, ErrorCategory::Input),
            (Error::InvalidTimestamp("x".into()), ErrorCategory::Input),
            (Error::Json(serde_json::from_str::<u8>("x").unwrap_err()), ErrorCategory::Io),
        ];
        for (err, cat) in cases {
            assert_eq!(err.category(), cat, "{err}");
            let code = err.code();
            match cat {
                ErrorCategory::Config => assert!((10..20).contains(&code)),
                ErrorCategory::Input => assert!((20..30).contains(&code)),
                ErrorCategory::Io => assert!((60..70).contains(&code)),
            }
        }
    }

    #[test]
    fn structured_error_carries_context() {
        let err = Error::InvalidParameter {
            field: "severity.percentile".into(),
            message: "must be in [0, 1]".into(),
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 11);
        assert_eq!(structured.category, ErrorCategory::Config);
        assert_eq!(
            structured.context.get("field"),
            Some(&serde_json::json!("severity.percentile"))
        );
        assert!(structured.to_json().contains("\"code\":11"));
    }

    #[test]
    fn category_display_is_snake_case() {
        let categories: Vec<String> = [ErrorCategory::Config, ErrorCategory::Input, ErrorCategory::Io]
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(categories, ["config", "input", "io"]);
        assert!(Error::InvalidDuration("x".into()).is_recoverable());
    }
}
