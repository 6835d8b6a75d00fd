//! Command-line overrides for engine configuration.
//!
//! Every engine knob has a flag. Flags are grouped per section and applied
//! on top of the loaded configuration; the result is validated again.

use std::path::PathBuf;

use ah_common::{parse_duration, parse_timestamp, GroupKey, Result, SortMode, TimeRange, WindowMode};
use ah_config::EngineConfig;
use clap::{Args, ValueEnum};

/// Window modes selectable on the command line. An explicit range is
/// given with `--start`/`--end` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    All,
    Peak,
    Recent,
}

fn parse_ts_arg(s: &str) -> std::result::Result<i64, String> {
    parse_timestamp(s).ok_or_else(|| format!("unparseable timestamp: {s}"))
}

fn parse_duration_arg(s: &str) -> std::result::Result<i64, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

fn parse_group_key(s: &str) -> std::result::Result<GroupKey, String> {
    GroupKey::parse(s).ok_or_else(|| format!("unknown dimension: {s} (location, condition, source, priority or a+b)"))
}

/// Record input.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Records file (JSON array or JSON lines); stdin when omitted or "-"
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

/// Observation window overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Window anchor mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Lookback from the anchor (e.g. 90m, 2h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub lookback: Option<i64>,

    /// Explicit window start (RFC 3339 or epoch ms); requires --end
    #[arg(long, value_parser = parse_ts_arg, requires = "end")]
    pub start: Option<i64>,

    /// Explicit window end (RFC 3339 or epoch ms); requires --start
    #[arg(long, value_parser = parse_ts_arg, requires = "start")]
    pub end: Option<i64>,

    /// Clamp the window to start no earlier than this
    #[arg(long, value_parser = parse_ts_arg, requires = "domain_end")]
    pub domain_start: Option<i64>,

    /// Clamp the window to end no later than this
    #[arg(long, value_parser = parse_ts_arg, requires = "domain_start")]
    pub domain_end: Option<i64>,
}

impl WindowArgs {
    pub fn apply(&self, config: &mut EngineConfig) -> Result<()> {
        if let Some(mode) = self.mode {
            config.window.mode = match mode {
                ModeArg::All => WindowMode::All,
                ModeArg::Peak => WindowMode::Peak,
                ModeArg::Recent => WindowMode::Recent,
            };
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            let range = TimeRange::checked(start, end)?;
            config.window.mode = WindowMode::Explicit {
                start: range.start,
                end: range.end,
            };
        }
        if let Some(lookback) = self.lookback {
            config.window.lookback_ms = lookback;
        }
        if let (Some(start), Some(end)) = (self.domain_start, self.domain_end) {
            config.window.domain = Some(TimeRange::checked(start, end)?);
        }
        Ok(())
    }
}

/// Top-K and highlight overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct TopKArgs {
    /// Maximum rows kept
    #[arg(long)]
    pub rows: Option<usize>,

    /// Maximum inner series before folding into "Other"
    #[arg(long)]
    pub inner_limit: Option<usize>,

    /// Row ordering
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Row dimension
    #[arg(long, value_parser = parse_group_key)]
    pub group_by: Option<GroupKey>,

    /// Inner (stacked) dimension
    #[arg(long, value_parser = parse_group_key)]
    pub inner_by: Option<GroupKey>,

    /// Highlight percentile in [0, 1]
    #[arg(long)]
    pub percentile: Option<f64>,
}

impl TopKArgs {
    pub fn apply(&self, config: &mut EngineConfig) {
        let top_k = &mut config.top_k;
        if let Some(v) = self.rows {
            top_k.row_limit = v;
        }
        if let Some(v) = self.inner_limit {
            top_k.inner_limit = v;
        }
        if let Some(v) = self.sort {
            top_k.sort = v;
        }
        if let Some(v) = &self.group_by {
            top_k.group_by = v.clone();
        }
        if let Some(v) = &self.inner_by {
            top_k.inner_by = v.clone();
        }
        if let Some(p) = self.percentile {
            config.severity.percentile = p;
        }
    }
}

/// Risk scoring overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct RiskArgs {
    /// Weight of the frequency count
    #[arg(long)]
    pub freq_weight: Option<f64>,

    /// Weight of the severity sum
    #[arg(long)]
    pub sev_weight: Option<f64>,

    /// Maximum ranked entities
    #[arg(long)]
    pub risk_limit: Option<usize>,

    /// Entity dimension
    #[arg(long, value_parser = parse_group_key)]
    pub risk_by: Option<GroupKey>,
}

impl RiskArgs {
    pub fn apply(&self, config: &mut EngineConfig) {
        let risk = &mut config.risk;
        if let Some(v) = self.freq_weight {
            risk.weights.freq = v;
        }
        if let Some(v) = self.sev_weight {
            risk.weights.sev = v;
        }
        if let Some(v) = self.risk_limit {
            risk.limit = v;
        }
        if let Some(v) = &self.risk_by {
            risk.group_by = v.clone();
        }
    }
}

/// Flood detection overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct FloodArgs {
    /// Per-source sliding window length in minutes
    #[arg(long)]
    pub window_minutes: Option<u64>,

    /// Activations per window that make a source unhealthy
    #[arg(long)]
    pub activation_threshold: Option<usize>,

    /// Distinct unhealthy sources needed for a flood
    #[arg(long)]
    pub source_threshold: Option<usize>,

    /// Maximum top sources listed per flood
    #[arg(long)]
    pub top_sources: Option<usize>,

    /// Report floods outside the selected observation window too
    #[arg(long)]
    pub all_floods: bool,
}

impl FloodArgs {
    pub fn apply(&self, config: &mut EngineConfig) {
        let flood = &mut config.flood;
        if let Some(v) = self.window_minutes {
            flood.window_minutes = v;
        }
        if let Some(v) = self.activation_threshold {
            flood.activation_threshold = v;
        }
        if let Some(v) = self.source_threshold {
            flood.source_count_threshold = v;
        }
        if let Some(v) = self.top_sources {
            flood.top_sources_limit = v;
        }
        if self.all_floods {
            flood.filter_to_window = false;
        }
    }
}

/// Bad actor overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct BadActorArgs {
    /// Include synthetic/system sources
    #[arg(long)]
    pub include_system: bool,

    /// Maximum ranked sources (0 for no limit)
    #[arg(long)]
    pub actor_limit: Option<usize>,
}

impl BadActorArgs {
    pub fn apply(&self, config: &mut EngineConfig) {
        if self.include_system {
            config.bad_actor.include_system = true;
        }
        if let Some(limit) = self.actor_limit {
            config.bad_actor.limit = (limit > 0).then_some(limit);
        }
    }
}
