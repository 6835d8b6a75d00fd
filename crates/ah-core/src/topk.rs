//! Top-K row reduction with an "Other" bucket for the inner dimension.
//!
//! Rows are sorted and truncated to `k`. Across the kept rows, when the
//! inner dimension has more than `inner_limit` distinct keys, the
//! `inner_limit - 1` largest (by contribution over the kept rows) survive
//! and the rest fold into a per-row "Other" value.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use ah_common::SortMode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::GroupAggregate;

/// Label of the folded inner bucket.
pub const OTHER_KEY: &str = "Other";

/// Rows dropped by the `k` truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Remainder {
    pub groups: usize,
    pub total: f64,
}

/// Result of a Top-K reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopKResult {
    pub rows: Vec<GroupAggregate>,
    /// `Some("Other")` when the inner dimension was folded.
    pub overflow_key: Option<String>,
    /// Inner keys kept as their own series, largest contribution first.
    pub inner_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remainder: Option<Remainder>,
}

impl TopKResult {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            overflow_key: None,
            inner_keys: Vec::new(),
            remainder: None,
        }
    }
}

/// Sort rows in place according to `sort`.
pub fn sort_rows(rows: &mut [GroupAggregate], sort: SortMode) {
    match sort {
        SortMode::Total => {
            rows.sort_by(|a, b| desc_total(a.total, b.total).then_with(|| a.key.cmp(&b.key)))
        }
        SortMode::Alphabetical => rows.sort_by(|a, b| a.key.cmp(&b.key)),
    }
}

/// Sort, keep the first `k` rows and fold the inner dimension down to
/// `inner_limit` series.
pub fn reduce<I>(groups: I, k: usize, sort: SortMode, inner_limit: usize) -> TopKResult
where
    I: IntoIterator<Item = GroupAggregate>,
{
    let mut rows: Vec<GroupAggregate> = groups.into_iter().collect();
    if rows.is_empty() {
        return TopKResult::empty();
    }
    sort_rows(&mut rows, sort);

    let remainder = if rows.len() > k {
        let dropped = rows.split_off(k);
        debug!(kept = k, dropped = dropped.len(), "truncated rows");
        Some(Remainder {
            groups: dropped.len(),
            total: dropped.iter().map(|g| g.total).sum(),
        })
    } else {
        None
    };

    let ranked = rank_inner_keys(&rows);
    if ranked.len() <= inner_limit {
        return TopKResult {
            rows,
            overflow_key: None,
            inner_keys: ranked,
            remainder,
        };
    }

    let keep_count = inner_limit.saturating_sub(1);
    let inner_keys: Vec<String> = ranked.into_iter().take(keep_count).collect();
    let kept: BTreeSet<&str> = inner_keys.iter().map(String::as_str).collect();

    for row in &mut rows {
        fold_row(row, &kept);
    }
    debug!(kept = inner_keys.len(), inner_limit, "folded inner keys");

    TopKResult {
        rows,
        overflow_key: Some(OTHER_KEY.to_string()),
        inner_keys,
        remainder,
    }
}

/// Inner keys ordered by contribution across `rows` (desc), ties by key.
fn rank_inner_keys(rows: &[GroupAggregate]) -> Vec<String> {
    let mut contribution: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        for (subkey, value) in &row.by_subkey {
            *contribution.entry(subkey.as_str()).or_insert(0.0) += value;
        }
    }
    let mut ranked: Vec<(&str, f64)> = contribution.into_iter().collect();
    ranked.sort_by(|a, b| desc_total(a.1, b.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(k, _)| k.to_string()).collect()
}

fn fold_row(row: &mut GroupAggregate, kept: &BTreeSet<&str>) {
    let mut folded = 0.0;
    let mut by_subkey = BTreeMap::new();
    for (subkey, value) in std::mem::take(&mut row.by_subkey) {
        if kept.contains(subkey.as_str()) {
            by_subkey.insert(subkey, value);
        } else {
            folded += value;
        }
    }
    if folded != 0.0 {
        *by_subkey.entry(OTHER_KEY.to_string()).or_insert(0.0) += folded;
    }
    row.by_subkey = by_subkey;
}

fn desc_total(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(key: &str, total: f64) -> GroupAggregate {
        GroupAggregate {
            total,
            ..GroupAggregate::new(key)
        }
    }

    fn keys(result: &TopKResult) -> Vec<&str> {
        result.rows.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn empty_groups() {
        assert_eq!(reduce(Vec::new(), 5, SortMode::Total, 10), TopKResult::empty());
    }

    #[test]
    fn total_sort_breaks_ties_by_key() {
        let groups = vec![group("b", 5.0), group("c", 9.0), group("a", 5.0)];
        let result = reduce(groups, 10, SortMode::Total, 10);
        assert_eq!(keys(&result), vec!["c", "a", "b"]);
        assert!(result.remainder.is_none());
    }

    #[test]
    fn alphabetical_ignores_totals() {
        let groups = vec![group("b", 1.0), group("a", 0.0), group("c", 100.0)];
        let result = reduce(groups, 2, SortMode::Alphabetical, 10);
        assert_eq!(keys(&result), vec!["a", "b"]);
        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.groups, 1);
        assert_eq!(remainder.total, 100.0);
    }

    #[test]
    fn folds_small_inner_keys_into_other() {
        let mut row = group("Boiler", 0.0);
        for (name, value) in [("HI", 10.0), ("LO", 5.0), ("HIHI", 3.0), ("LOLO", 1.0)] {
            row.by_subkey.insert(name.to_string(), value);
            row.total += value;
        }
        let result = reduce(vec![row], 10, SortMode::Total, 3);

        assert_eq!(result.overflow_key.as_deref(), Some(OTHER_KEY));
        assert_eq!(result.inner_keys, vec!["HI", "LO"]);
        let folded = &result.rows[0].by_subkey;
        assert_eq!(folded[OTHER_KEY], 4.0);
        assert_eq!(folded.values().sum::<f64>(), result.rows[0].total);
    }

    #[test]
    fn other_only_added_when_nonzero() {
        let mut a = group("A", 5.0);
        a.by_subkey.insert("x".into(), 5.0);
        let mut b = group("B", 1.0);
        b.by_subkey.insert("y".into(), 1.0);
        b.by_subkey.insert("z".into(), 0.0);

        let result = reduce(vec![a, b], 10, SortMode::Total, 2);
        assert_eq!(result.inner_keys, vec!["x"]);
        assert!(!result.rows[0].by_subkey.contains_key(OTHER_KEY));
        assert_eq!(result.rows[1].by_subkey[OTHER_KEY], 1.0);
    }

    #[test]
    fn inner_ranking_only_counts_kept_rows() {
        let mut a = group("A", 10.0);
        a.by_subkey.insert("kept".into(), 10.0);
        let mut b = group("B", 1.0);
        b.by_subkey.insert("dropped".into(), 1.0);

        let result = reduce(vec![a, b], 1, SortMode::Total, 1);
        assert_eq!(result.overflow_key, None);
        assert_eq!(result.inner_keys, vec!["kept"]);
    }
}
