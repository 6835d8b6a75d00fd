//! Reading records from files or stdin.
//!
//! Accepted layouts: a JSON array, or one JSON object per line (blank lines
//! are skipped).

use std::io::Read;
use std::path::Path;

use ah_common::{Error, Result};
use serde::de::DeserializeOwned;

/// Read all of `path`, or stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Parse a JSON array or JSON lines into items.
pub fn parse_items<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| Error::InvalidInput(e.to_string()));
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::InvalidInput(format!("line {}: {e}", idx + 1)))
        })
        .collect()
}

/// Read and parse items from `path` or stdin.
pub fn load_items<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>> {
    parse_items(&read_input(path)?)
}
