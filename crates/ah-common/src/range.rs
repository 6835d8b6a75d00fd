//! Time ranges and the selection/sort modes that act on them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed interval `[start, end]` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Build a range, rejecting `end < start`.
    pub fn checked(start: i64, end: i64) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Half-open overlap test: `min(end_a, end_b) > max(start_a, start_b)`.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.end.min(other.end) > self.start.max(other.start)
    }

    /// Clamp both bounds into `domain`.
    pub fn clamp_to(&self, domain: &TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.max(domain.start),
            end: self.end.min(domain.end),
        }
    }
}

/// How the observation window is chosen from a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum WindowMode {
    /// No filtering.
    All,
    /// Anchor on the record with the largest weight.
    #[default]
    Peak,
    /// Anchor on the most recent record.
    Recent,
    /// Caller-supplied bounds; anchors are not computed.
    Explicit { start: i64, end: i64 },
}

impl WindowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowMode::All => "all",
            WindowMode::Peak => "peak",
            WindowMode::Recent => "recent",
            WindowMode::Explicit { .. } => "explicit",
        }
    }
}

/// Row ordering for Top-K reduction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// `total` descending, ties by key ascending.
    #[default]
    Total,
    /// Key ascending, `total` ignored.
    Alphabetical,
}
