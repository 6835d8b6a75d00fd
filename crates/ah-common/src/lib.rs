//! Alarm health common types, records, and errors.
//!
//! This crate provides foundational types shared across the engine crates:
//! - Raw and resolved alarm activation records
//! - Time ranges, window modes and sort modes
//! - Group key extraction and sentinel normalization
//! - Common error types
//! - CLI payload formats

pub mod error;
pub mod keys;
pub mod output;
pub mod range;
pub mod record;
pub mod time;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use keys::{normalize_key, GroupKey, KeyFn, NOT_PROVIDED, UNKNOWN_LOCATION};
pub use output::OutputFormat;
pub use range::{SortMode, TimeRange, WindowMode};
pub use record::{ingest, ActivationRecord, IngestStats, RawActivationRecord};
pub use time::{format_timestamp, parse_duration, parse_timestamp, MS_PER_MINUTE};

/// Schema version stamped into every report.
pub const SCHEMA_VERSION: &str = "1.0.0";
