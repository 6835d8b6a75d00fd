//! Ingestion tests over realistic JSON payloads.

use ah_common::{ingest, GroupKey, KeyFn, RawActivationRecord, UNKNOWN_LOCATION};

const PAYLOAD: &str = r#"[
  {"source": "TI-101", "location_tag": "Boiler House", "condition": "HI",
   "priority": "High", "event_time": "2024-05-01T10:00:00Z", "flood_count": 12},
  {"source": "PI-220", "location_tag": "n/a", "condition": "LO",
   "event_time": "2024-05-01 10:03:00", "hits": 4},
  {"source": "LS-330", "condition": "", "event_time": "not a time", "flood_count": "3"},
  {"source": "FI-440", "peak_window_start": "2024-05-01T09:55:00Z",
   "peak_window_end": "2024-05-01T10:05:00Z", "flood_count": null, "hits": 2}
]"#;

#[test]
fn payload_resolves_every_record() {
    let raws: Vec<RawActivationRecord> = serde_json::from_str(PAYLOAD).expect("payload parses");
    let (records, stats) = ingest(raws);

    assert_eq!(stats.total, 4);
    assert_eq!(stats.without_timestamp, 1);

    let weights: Vec<f64> = records.iter().map(|r| r.weight).collect();
    // null flood_count is absent, so hits applies
    assert_eq!(weights, vec![12.0, 4.0, 3.0, 2.0]);

    assert_eq!(GroupKey::Location.key(&records[1]), UNKNOWN_LOCATION);
    assert_eq!(GroupKey::Location.key(&records[0]), "Boiler House");
    assert_eq!(records[3].order_ts(), records[3].peak_window_start);
}

#[test]
fn raw_records_serialize_sparsely() {
    let raws: Vec<RawActivationRecord> = serde_json::from_str(PAYLOAD).expect("payload parses");
    let json = serde_json::to_string(&raws[2]).expect("serialize");
    assert!(!json.contains("location_tag"));
    assert!(!json.contains("hits"));
}

mod properties {
    use ah_common::{normalize_key, parse_timestamp, ActivationRecord, NOT_PROVIDED};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_keys_are_stable(raw in ".{0,24}") {
            let once = normalize_key(Some(&raw), NOT_PROVIDED);
            let twice = normalize_key(Some(&once), NOT_PROVIDED);
            prop_assert_eq!(&once, &twice);
            prop_assert!(!once.is_empty());
        }

        #[test]
        fn weights_are_never_negative(
            flood_count in prop::option::of(prop::num::f64::ANY),
            hits in prop::option::of(-1_000i64..1_000),
        ) {
            let raw: ah_common::RawActivationRecord = serde_json::from_value(serde_json::json!({
                "source": "TI-1",
                "flood_count": flood_count.and_then(serde_json::Number::from_f64),
                "hits": hits,
            }))
            .unwrap();
            let record = ActivationRecord::from_raw(raw);
            prop_assert!(record.weight >= 0.0 && record.weight.is_finite());
        }

        #[test]
        fn epoch_strings_round_trip(ms in -10_000_000_000_000i64..10_000_000_000_000) {
            prop_assert_eq!(parse_timestamp(&ms.to_string()), Some(ms));
        }
    }
}
