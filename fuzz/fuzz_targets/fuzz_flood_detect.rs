//! Fuzz target for flood detection.
//!
//! Source windows come straight from the fuzzer, including inverted and
//! zero-length ones, which must be rejected rather than produce
//! non-finite rates. Bounds and counts span the full integer range so
//! duration and count arithmetic is exercised at its limits.

#![no_main]

use ah_core::bad_actor;
use ah_core::flood::{detect, FloodParams, FloodSummary};
use ah_core::unhealthy::SourceWindow;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    windows: Vec<(u8, i64, i64, u64)>,
    source_count_threshold: u8,
    top_sources_limit: u8,
    include_system: bool,
}

const SOURCES: &[&str] = &["TI-1", "PI-2", "FI-3", "$system", "sys:clock", "__meta"];

fuzz_target!(|input: Input| {
    let windows: Vec<SourceWindow> = input
        .windows
        .iter()
        .map(|&(source, start, end, count)| {
            let name = SOURCES[usize::from(source) % SOURCES.len()];
            SourceWindow::new(name, start, end, count)
        })
        .collect();
    let params = FloodParams {
        source_count_threshold: usize::from(input.source_count_threshold.max(1)),
        top_sources_limit: usize::from(input.top_sources_limit),
    };

    let floods = detect(&windows, params);
    for flood in &floods {
        assert!(flood.start < flood.end);
        assert!(flood.rate_per_min.is_finite() && flood.rate_per_min >= 0.0);
        assert!(flood.duration_minutes() > 0.0);
        assert!(flood.top_sources.len() <= params.top_sources_limit);
    }
    let summary = FloodSummary::from_windows(&floods, None);
    assert!(summary.longest_window_ms >= 0);
    let _ = bad_actor::rank(&floods, input.include_system, None);
});
