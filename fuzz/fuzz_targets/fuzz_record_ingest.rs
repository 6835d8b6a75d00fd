//! Fuzz target for record ingestion and the analysis pipeline.
//!
//! Arbitrary bytes are parsed as a JSON array or JSON lines of raw
//! activation records; whatever parses is run through the full pipeline.
//! Malformed fields must degrade to absent values, never panic.

#![no_main]

use ah_common::{ingest, RawActivationRecord};
use ah_config::EngineConfig;
use ah_core::engine::analyze;
use ah_core::input::parse_items;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(raws) = parse_items::<RawActivationRecord>(text) else {
        return;
    };
    let (records, stats) = ingest(raws);
    assert_eq!(stats.total, records.len());
    assert!(records.iter().all(|r| r.weight >= 0.0 && r.weight.is_finite()));

    let report = analyze(&records, &EngineConfig::default());
    for flood in &report.floods {
        assert_eq!(flood.source_count, flood.sources_involved.len());
        assert_eq!(flood.flood_count, flood.sources_involved.values().sum::<u64>());
    }
});
