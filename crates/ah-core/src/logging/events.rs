//! Structured log events.
//!
//! Every JSONL line carries the run id and the pipeline stage it came from,
//! so a single analysis can be followed end to end.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Pipeline stages of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading and resolving records.
    Ingest,
    /// Observation window selection.
    Window,
    /// Grouping, Top-K and thresholds.
    Aggregate,
    /// Risk scoring.
    Score,
    /// Unhealthy-period classification and flood detection.
    Flood,
    /// Bad actor ranking.
    Rank,
    /// Rendering the payload.
    Output,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Window => "window",
            Stage::Aggregate => "aggregate",
            Stage::Score => "score",
            Stage::Flood => "flood",
            Stage::Rank => "rank",
            Stage::Output => "output",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard event names.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INGEST_FINISHED: &str = "ingest.finished";
    pub const INGEST_ERROR: &str = "ingest.error";

    pub const WINDOW_SELECTED: &str = "window.selected";
    pub const WINDOW_NONE: &str = "window.none";

    pub const AGGREGATE_FINISHED: &str = "aggregate.finished";
    pub const SCORE_FINISHED: &str = "score.finished";
    pub const FLOOD_DETECTED: &str = "flood.detected";
    pub const RANK_FINISHED: &str = "rank.finished";

    pub const OUTPUT_WRITTEN: &str = "output.written";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A structured log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,
    /// Event name, e.g. "flood.detected".
    pub event: String,
    pub run_id: String,
    pub stage: Stage,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEvent {
    pub fn new(
        level: Level,
        event: impl Into<String>,
        run_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: run_id.into(),
            stage,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach a field. Values that fail to serialize are dropped.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }

    /// Forward the event to the active `tracing` subscriber.
    pub fn emit(&self) {
        let fields = serde_json::to_string(&self.fields).unwrap_or_default();
        match self.level {
            Level::Trace => tracing::trace!(event = %self.event, run_id = %self.run_id, stage = %self.stage, fields = %fields, "{}", self.message),
            Level::Debug => tracing::debug!(event = %self.event, run_id = %self.run_id, stage = %self.stage, fields = %fields, "{}", self.message),
            Level::Info => tracing::info!(event = %self.event, run_id = %self.run_id, stage = %self.stage, fields = %fields, "{}", self.message),
            Level::Warn => tracing::warn!(event = %self.event, run_id = %self.run_id, stage = %self.stage, fields = %fields, "{}", self.message),
            Level::Error => tracing::error!(event = %self.event, run_id = %self.run_id, stage = %self.stage, fields = %fields, "{}", self.message),
        }
    }
}

/// Creates events sharing one run id.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        LogEvent::new(level, event, &self.run_id, stage, message)
    }

    pub fn info(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Info, event, stage, message)
    }

    pub fn debug(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Debug, event, stage, message)
    }

    pub fn warn(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Warn, event, stage, message)
    }

    pub fn error(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Error, event, stage, message)
    }
}
