//! Group key extraction and normalization.
//!
//! Blank and "unknown"-style inputs collapse to a single sentinel per
//! dimension so that `""`, `"N/A"` and `"unknown"` never produce three
//! separate groups.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::record::ActivationRecord;

/// Sentinel for records without a usable location.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Sentinel for every other missing dimension.
pub const NOT_PROVIDED: &str = "Not Provided";

/// Separator between parts of a compound key.
pub const COMPOUND_SEPARATOR: &str = " | ";

const PLACEHOLDERS: &[&str] = &[
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "not provided",
    "unknown location",
];

/// Whether a raw value carries no information.
pub fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Trim `raw`, or return `sentinel` if it is missing or a placeholder.
pub fn normalize_key(raw: Option<&str>, sentinel: &str) -> String {
    match raw {
        Some(v) if !is_placeholder(v) => v.trim().to_string(),
        _ => sentinel.to_string(),
    }
}

/// Extracts a grouping key from a record.
pub trait KeyFn {
    fn key(&self, record: &ActivationRecord) -> String;
}

impl<F> KeyFn for F
where
    F: Fn(&ActivationRecord) -> String,
{
    fn key(&self, record: &ActivationRecord) -> String {
        self(record)
    }
}

/// Built-in grouping dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Location,
    Condition,
    Source,
    Priority,
    Compound(Vec<GroupKey>),
}

impl GroupKey {
    /// Field name used for the key column in chart rows.
    pub fn field_name(&self) -> String {
        match self {
            GroupKey::Location => "location_tag".to_string(),
            GroupKey::Condition => "condition".to_string(),
            GroupKey::Source => "source".to_string(),
            GroupKey::Priority => "priority".to_string(),
            GroupKey::Compound(parts) => parts
                .iter()
                .map(GroupKey::field_name)
                .collect::<Vec<_>>()
                .join("+"),
        }
    }

    /// Parse `location`, `condition+location`, ... into a key.
    pub fn parse(s: &str) -> Option<GroupKey> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        if parts.len() > 1 {
            let keys = parts
                .into_iter()
                .map(Self::parse_single)
                .collect::<Option<Vec<_>>>()?;
            return Some(GroupKey::Compound(keys));
        }
        Self::parse_single(parts[0])
    }

    fn parse_single(s: &str) -> Option<GroupKey> {
        match s.to_lowercase().as_str() {
            "location" | "location_tag" | "loc" => Some(GroupKey::Location),
            "condition" | "cond" => Some(GroupKey::Condition),
            "source" | "src" | "tag" => Some(GroupKey::Source),
            "priority" | "prio" => Some(GroupKey::Priority),
            _ => None,
        }
    }
}

impl KeyFn for GroupKey {
    fn key(&self, record: &ActivationRecord) -> String {
        match self {
            GroupKey::Location => normalize_key(record.location_tag.as_deref(), UNKNOWN_LOCATION),
            GroupKey::Condition => normalize_key(record.condition.as_deref(), NOT_PROVIDED),
            GroupKey::Source => normalize_key(Some(record.source.as_str()), NOT_PROVIDED),
            GroupKey::Priority => normalize_key(record.priority.as_deref(), NOT_PROVIDED),
            GroupKey::Compound(parts) => parts
                .iter()
                .map(|p| p.key(record))
                .collect::<Vec<_>>()
                .join(COMPOUND_SEPARATOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: Option<&str>, condition: Option<&str>) -> ActivationRecord {
        ActivationRecord {
            source: "TI-101".to_string(),
            location_tag: location.map(str::to_string),
            condition: condition.map(str::to_string),
            ..ActivationRecord::default()
        }
    }

    #[test]
    fn placeholders_collapse_to_sentinel() {
        for raw in ["", "   ", "N/A", "n/a", "Unknown", "NOT PROVIDED", "null"] {
            assert_eq!(normalize_key(Some(raw), UNKNOWN_LOCATION), UNKNOWN_LOCATION, "{raw:?}");
        }
        assert_eq!(normalize_key(None, NOT_PROVIDED), NOT_PROVIDED);
    }

    #[test]
    fn real_values_are_trimmed() {
        assert_eq!(normalize_key(Some("  Unit 3 "), UNKNOWN_LOCATION), "Unit 3");
        assert_eq!(normalize_key(Some("Unknowns"), NOT_PROVIDED), "Unknowns");
    }

    #[test]
    fn compound_key_joins_parts() {
        let key = GroupKey::Compound(vec![GroupKey::Location, GroupKey::Condition]);
        let r = record(Some("Boiler"), None);
        assert_eq!(key.key(&r), "Boiler | Not Provided");
        assert_eq!(key.field_name(), "location_tag+condition");
    }

    #[test]
    fn closures_are_key_fns() {
        let by_source = |r: &ActivationRecord| r.source.to_lowercase();
        assert_eq!(by_source.key(&record(None, None)), "ti-101");
    }

    #[test]
    fn parse_group_keys() {
        assert_eq!(GroupKey::parse("location"), Some(GroupKey::Location));
        assert_eq!(
            GroupKey::parse("location+condition"),
            Some(GroupKey::Compound(vec![GroupKey::Location, GroupKey::Condition]))
        );
        assert_eq!(GroupKey::parse("bogus"), None);
        assert_eq!(GroupKey::parse("location+bogus"), None);
    }
}
