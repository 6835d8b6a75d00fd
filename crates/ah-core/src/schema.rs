//! JSON Schema generation for input and output types.
//!
//! ```bash
//! ah-core schema --list
//! ah-core schema FloodWindow
//! ah-core schema --all
//! ```

use std::collections::BTreeMap;

use schemars::schema_for;
use serde_json::Value;

pub use crate::aggregate::GroupAggregate;
pub use crate::bad_actor::BadActor;
pub use crate::engine::AnalyticsReport;
pub use crate::flood::{FloodSummary, FloodWindow};
pub use crate::risk::{RankedEntity, RiskInput};
pub use crate::topk::TopKResult;
pub use crate::unhealthy::SourceWindow;
pub use ah_common::RawActivationRecord;
pub use ah_config::EngineConfig;

/// Schema type names with descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Input
        ("RawActivationRecord", "One alarm activation record as supplied"),
        ("SourceWindow", "Per-source unhealthy period (flood detector input)"),
        ("RiskInput", "Per-entity frequency and severity sums"),
        ("EngineConfig", "Engine configuration file"),
        // Output
        ("GroupAggregate", "Accumulated totals for one group key"),
        ("TopKResult", "Top-K rows with folded inner dimension"),
        ("RankedEntity", "Risk-scored entity"),
        ("FloodWindow", "Detected multi-source flood window"),
        ("FloodSummary", "Totals over a set of flood windows"),
        ("BadActor", "Source contribution to flood windows"),
        ("AnalyticsReport", "Complete analysis report"),
    ]
}

/// Schema for a type by name, or `None` if the name is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "RawActivationRecord" => schema_for!(RawActivationRecord),
        "SourceWindow" => schema_for!(SourceWindow),
        "RiskInput" => schema_for!(RiskInput),
        "EngineConfig" => schema_for!(EngineConfig),
        "GroupAggregate" => schema_for!(GroupAggregate),
        "TopKResult" => schema_for!(TopKResult),
        "RankedEntity" => schema_for!(RankedEntity),
        "FloodWindow" => schema_for!(FloodWindow),
        "FloodSummary" => schema_for!(FloodSummary),
        "BadActor" => schema_for!(BadActor),
        "AnalyticsReport" => schema_for!(AnalyticsReport),
        _ => return None,
    };
    serde_json::to_value(schema).ok()
}

/// Every schema keyed by type name.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Pretty-printed JSON (default).
    Json,
    /// Single-line JSON.
    JsonCompact,
}

pub fn format_schema(schema: &Value, format: SchemaFormat) -> String {
    let rendered = match format {
        SchemaFormat::Json => serde_json::to_string_pretty(schema),
        SchemaFormat::JsonCompact => serde_json::to_string(schema),
    };
    rendered.unwrap_or_else(|_| schema.to_string())
}
