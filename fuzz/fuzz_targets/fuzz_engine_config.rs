//! Fuzz target for engine configuration parsing.
//!
//! Tests that JSON and TOML config parsing plus semantic validation handle
//! arbitrary input without panicking.

#![no_main]

use ah_config::{validate_config, EngineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<EngineConfig>(data) {
        let _ = validate_config(&config);
    }
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<EngineConfig>(text) {
            let _ = validate_config(&config);
        }
    }
});
