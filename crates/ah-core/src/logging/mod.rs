//! Structured logging for the alarm-health CLI.
//!
//! Two output modes, both on stderr so that stdout carries only command
//! payloads:
//! - human-readable console lines for interactive use
//! - JSONL for pipelines, one object per event with `run_id` and `stage`
//!
//! ```ignore
//! use ah_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::new(generate_run_id());
//! ctx.info(event_names::RUN_STARTED, Stage::Init, "starting analysis").emit();
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogContext, LogEvent, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose diagnostics the level applies to.
const LOG_TARGETS: &[&str] = &["ah_core", "ah_common", "ah_config", "ah_math"];

fn build_filter(config: &LogConfig) -> EnvFilter {
    let directives = LOG_TARGETS
        .iter()
        .map(|t| format!("{t}={}", config.level))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .parse_lossy(directives)
}

/// Install the global subscriber.
///
/// Call once at startup. A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter = build_filter(config);

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(JsonlLayer::stderr())
            .try_init(),
    };
    // Already initialized (tests, embedding); keep the existing subscriber.
    let _ = result;
}

/// Unique id for one invocation: `run-` plus 12 hex chars.
pub fn generate_run_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &simple[..12])
}
