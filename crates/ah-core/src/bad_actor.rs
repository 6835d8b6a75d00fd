//! Bad actor ranking over flood windows.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::flood::FloodWindow;

/// Reserved source names (compared case-insensitively).
const META_LITERALS: &[&str] = &["system", "$system", "$meta"];

/// Reserved source name prefixes (compared case-insensitively).
const META_PREFIXES: &[&str] = &["$", "sys:", "__"];

/// Whether `name` is a synthetic/system source rather than a plant tag.
pub fn is_meta_source(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    META_LITERALS.contains(&lower.as_str()) || META_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// A source's contribution to flood windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadActor {
    #[serde(rename = "Source")]
    pub source: String,
    pub total_contribution: u64,
    /// Windows in which the source contributed a non-zero count.
    pub involvement_count: usize,
}

/// Rank sources by total contribution (desc, ties by name).
pub fn rank(windows: &[FloodWindow], include_system: bool, limit: Option<usize>) -> Vec<BadActor> {
    let mut acc: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for window in windows {
        for (source, &count) in &window.sources_involved {
            if !include_system && is_meta_source(source) {
                continue;
            }
            let entry = acc.entry(source.as_str()).or_insert((0, 0));
            entry.0 = entry.0.saturating_add(count);
            if count > 0 {
                entry.1 += 1;
            }
        }
    }

    let mut ranked: Vec<BadActor> = acc
        .into_iter()
        .map(|(source, (total, involvement))| BadActor {
            source: source.to_string(),
            total_contribution: total,
            involvement_count: involvement,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_contribution
            .cmp(&a.total_contribution)
            .then_with(|| a.source.cmp(&b.source))
    });
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}
