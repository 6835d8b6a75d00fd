//! End-to-end scenarios for the analytics components.
//!
//! Each module exercises one component with a small, fully worked input
//! whose expected output can be checked by hand.

use std::collections::BTreeMap;

use ah_common::{
    ingest, ActivationRecord, GroupKey, RawActivationRecord, SortMode, WindowMode, MS_PER_MINUTE,
};
use ah_config::EngineConfig;
use ah_core::aggregate::{aggregate, GroupAggregate};
use ah_core::flood::{detect, FloodParams};
use ah_core::unhealthy::SourceWindow;
use ah_core::{bad_actor, engine, threshold, topk, window, OTHER_KEY};

const MIN: i64 = MS_PER_MINUTE;

mod window_selection {
    use super::*;

    #[test]
    fn peak_anchor_uses_heaviest_record() {
        let records = vec![
            ActivationRecord::new("A", Some(0), 5.0),
            ActivationRecord::new("B", Some(10 * MIN), 20.0),
            ActivationRecord::new("C", Some(30 * MIN), 3.0),
        ];
        let selected = window::select(&records, WindowMode::Peak, 20 * MIN, None).unwrap();
        assert_eq!(selected.start, -10 * MIN);
        assert_eq!(selected.end, 10 * MIN);
    }

    #[test]
    fn peak_window_is_clamped_to_domain() {
        let records = vec![
            ActivationRecord::new("A", Some(0), 5.0),
            ActivationRecord::new("B", Some(10 * MIN), 20.0),
            ActivationRecord::new("C", Some(30 * MIN), 3.0),
        ];
        let domain = ah_common::TimeRange::new(0, 60 * MIN);
        let selected = window::select(&records, WindowMode::Peak, 20 * MIN, Some(domain)).unwrap();
        assert_eq!(selected.start, 0);
        assert_eq!(selected.end, 10 * MIN);
    }
}

mod top_k_with_other {
    use super::*;

    fn group(key: &str, subkeys: &[(&str, f64)]) -> GroupAggregate {
        let mut g = GroupAggregate::new(key);
        for (subkey, value) in subkeys {
            g.by_subkey.insert(subkey.to_string(), *value);
            g.total += value;
        }
        g
    }

    fn groups() -> Vec<GroupAggregate> {
        let a_conditions: Vec<(String, f64)> = [8.0, 7.0, 6.0, 5.0, 5.0, 4.0, 4.0, 3.0, 3.0, 2.0, 2.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("c{:02}", i + 1), *v))
            .collect();
        let a_refs: Vec<(&str, f64)> = a_conditions.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        vec![
            group("E", &[("c01", 1.0)]),
            group("C", &[("c02", 10.0)]),
            group("A", &a_refs),
            group("D", &[("c03", 5.0)]),
            group("B", &[("c01", 30.0)]),
        ]
    }

    #[test]
    fn keeps_three_largest_rows() {
        let result = topk::reduce(groups(), 3, SortMode::Total, 10);
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["A", "B", "C"]);
        assert_eq!(result.rows[0].total, 50.0);

        let remainder = result.remainder.unwrap();
        assert_eq!(remainder.groups, 2);
        assert_eq!(remainder.total, 6.0);
    }

    #[test]
    fn folds_three_smallest_conditions_into_other() {
        let result = topk::reduce(groups(), 3, SortMode::Total, 10);
        assert_eq!(result.overflow_key.as_deref(), Some(OTHER_KEY));
        assert_eq!(result.inner_keys.len(), 9);
        assert!(!result.inner_keys.iter().any(|k| k == "c10" || k == "c11" || k == "c12"));

        let a = &result.rows[0];
        assert_eq!(a.by_subkey.get(OTHER_KEY), Some(&5.0));
        assert_eq!(a.by_subkey.values().sum::<f64>(), a.total);

        // Rows whose conditions are all kept get no Other column.
        assert!(!result.rows[1].by_subkey.contains_key(OTHER_KEY));
        assert!(!result.rows[2].by_subkey.contains_key(OTHER_KEY));
    }

    #[test]
    fn alphabetical_ignores_totals() {
        let result = topk::reduce(groups(), 3, SortMode::Alphabetical, 20);
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["A", "B", "C"]);
        assert!(result.overflow_key.is_none());
    }
}

mod flood_detection {
    use super::*;

    #[test]
    fn overlapping_sources_merge_into_one_flood() {
        let ten = 600 * MIN;
        let windows = vec![
            SourceWindow::new("X", ten, ten + 10 * MIN, 6),
            SourceWindow::new("Y", ten + 5 * MIN, ten + 15 * MIN, 4),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(floods.len(), 1);

        let flood = &floods[0];
        assert_eq!(flood.start, ten);
        assert_eq!(flood.end, ten + 15 * MIN);
        assert_eq!(flood.source_count, 2);
        assert_eq!(flood.flood_count, 10);
        assert!((flood.rate_per_min - 10.0 / 15.0).abs() < 1e-9);
        assert_eq!(flood.top_sources[0].source, "X");
    }

    #[test]
    fn single_source_is_not_a_flood() {
        let windows = vec![
            SourceWindow::new("X", 0, 10 * MIN, 6),
            SourceWindow::new("X", 5 * MIN, 15 * MIN, 4),
        ];
        assert!(detect(&windows, FloodParams::default()).is_empty());
    }
}

mod bad_actors {
    use super::*;

    #[test]
    fn system_sources_are_excluded() {
        let windows = vec![
            SourceWindow::new("$META", 0, 10 * MIN, 100),
            SourceWindow::new("TI-101", 0, 10 * MIN, 7),
            SourceWindow::new("PI-202", 2 * MIN, 12 * MIN, 3),
        ];
        let floods = detect(&windows, FloodParams::default());
        assert_eq!(floods.len(), 1);

        let ranked = bad_actor::rank(&floods, false, None);
        assert!(ranked.iter().all(|a| a.source != "$META"));
        assert_eq!(ranked[0].source, "TI-101");
        assert_eq!(ranked[0].total_contribution, 7);

        let with_system = bad_actor::rank(&floods, true, None);
        assert_eq!(with_system[0].source, "$META");
        assert_eq!(with_system[0].total_contribution, 100);
    }
}

mod empty_input {
    use super::*;

    #[test]
    fn every_component_is_neutral() {
        let records: Vec<ActivationRecord> = Vec::new();
        assert!(aggregate(&records, &GroupKey::Location, None).is_empty());
        assert_eq!(threshold::estimate(&[], 0.85), f64::INFINITY);
        assert!(window::select(&records, WindowMode::Peak, 20 * MIN, None).is_none());
        assert!(detect(&[], FloodParams::default()).is_empty());
        assert!(bad_actor::rank(&[], false, None).is_empty());
    }

    #[test]
    fn empty_report() {
        let report = engine::analyze(&[], &EngineConfig::default());
        assert!(report.is_empty());
        assert!(report.window.is_none());
        assert!(report.chart.rows.is_empty());
        assert!(report.chart.threshold.is_none());
        assert!(report.risk.is_empty());
        assert!(!report.has_floods());
    }
}

mod pipeline {
    use super::*;

    fn burst(source: &str, start_minute: i64) -> Vec<RawActivationRecord> {
        (0..10)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "source": source,
                    "location_tag": "Unit 1",
                    "condition": "HI",
                    "priority": "High",
                    "event_time": format!("2024-05-01T10:{:02}:00Z", start_minute + i),
                    "hits": 1,
                }))
                .unwrap()
            })
            .collect()
    }

    fn records() -> Vec<ActivationRecord> {
        let mut raws = burst("TI-100", 0);
        raws.extend(burst("PI-200", 5));
        raws.extend(burst("$system", 2));
        let (records, stats) = ingest(raws);
        assert_eq!(stats.total, 30);
        assert_eq!(stats.without_timestamp, 0);
        records
    }

    #[test]
    fn raw_records_flow_through_every_stage() {
        let mut config = EngineConfig::default();
        config.window.mode = WindowMode::Recent;

        let report = engine::analyze(&records(), &config);
        assert_eq!(report.records_in_window, 30);
        assert_eq!(report.unhealthy_periods, 3);
        assert_eq!(report.floods.len(), 1);

        let flood = &report.floods[0];
        assert_eq!(flood.source_count, 3);
        assert_eq!(flood.flood_count, 30);
        assert_eq!(flood.end - flood.start, 15 * MIN);

        let actors: Vec<&str> = report.bad_actors.iter().map(|a| a.source.as_str()).collect();
        assert_eq!(actors, ["PI-200", "TI-100"]);

        let row = &report.chart.rows[0];
        assert_eq!(row.get("location_tag"), Some(&serde_json::json!("Unit 1")));
        assert_eq!(row.get("total"), Some(&serde_json::json!(30.0)));
    }

    #[test]
    fn analysis_is_deterministic_apart_from_timestamp() {
        let mut config = EngineConfig::default();
        config.window.mode = WindowMode::Recent;
        let records = records();

        let mut first = engine::analyze(&records, &config);
        let second = engine::analyze(&records, &config);
        first.generated_at = second.generated_at;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn floods_outside_window_are_filtered() {
        let mut config = EngineConfig::default();
        config.window.mode = WindowMode::Explicit {
            start: 0,
            end: 1_000,
        };
        let report = engine::analyze(&records(), &config);
        assert_eq!(report.records_in_window, 0);
        assert!(report.floods.is_empty());

        config.flood.filter_to_window = false;
        let unfiltered = engine::analyze(&records(), &config);
        assert_eq!(unfiltered.floods.len(), 1);
    }

    #[test]
    fn risk_prefers_severity_weighted_sources() {
        let mut raws: Vec<RawActivationRecord> = Vec::new();
        let mut counts: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
        counts.insert("FI-1", ("Low", 6));
        counts.insert("FI-2", ("Critical", 3));
        for (source, (priority, n)) in &counts {
            for i in 0..*n {
                raws.push(RawActivationRecord {
                    source: source.to_string(),
                    priority: Some(priority.to_string()),
                    event_time: Some(serde_json::json!(i as i64 * MIN)),
                    hits: Some(serde_json::json!(1)),
                    ..RawActivationRecord::default()
                });
            }
        }
        let (records, _) = ingest(raws);
        let refs: Vec<&ActivationRecord> = records.iter().collect();
        let ranked = engine::risk_ranking(&refs, &EngineConfig::default().risk);

        // FI-1: 0.3*6 + 0.7*6 = 6.0; FI-2: 0.3*3 + 0.7*12 = 9.3
        assert_eq!(ranked[0].key, "FI-2");
        assert_eq!(ranked[0].normalized_score, 100.0);
        assert!((ranked[1].composite_score - 6.0).abs() < 1e-9);
    }
}
