//! Alarm health analytics engine.
//!
//! Deterministic transforms from raw alarm activation records to ranked,
//! windowed and severity-scored summaries:
//! - observation window selection (`window`)
//! - grouping and Top-K folding (`aggregate`, `topk`)
//! - percentile highlight thresholds (`threshold`)
//! - composite risk scoring (`risk`)
//! - unhealthy-period classification and flood detection (`unhealthy`, `flood`)
//! - bad actor ranking (`bad_actor`)
//! - the combined pipeline (`engine`) and last-request-wins publication
//!   (`sequence`)
//!
//! The binary entry point is in `main.rs`.

pub mod aggregate;
pub mod bad_actor;
pub mod cli;
pub mod engine;
pub mod exit_codes;
pub mod flood;
pub mod input;
pub mod logging;
pub mod output;
pub mod risk;
pub mod schema;
pub mod sequence;
pub mod threshold;
pub mod topk;
pub mod unhealthy;
pub mod window;

pub use aggregate::{aggregate, GroupAggregate};
pub use bad_actor::{is_meta_source, BadActor};
pub use engine::{analyze, AnalyticsReport, ChartSection, Reduction};
pub use flood::{filter_by_range, FloodParams, FloodSummary, FloodWindow, SourceContribution};
pub use risk::{RankedEntity, RiskInput};
pub use sequence::{LatestSlot, RequestSequencer, RequestTicket};
pub use topk::{TopKResult, OTHER_KEY};
pub use unhealthy::SourceWindow;
