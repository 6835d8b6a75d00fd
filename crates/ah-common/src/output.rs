//! Payload formats for CLI commands.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a command writes its payload to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,

    /// Compact JSON; list payloads get one item per line
    Jsonl,

    /// Markdown tables
    Md,

    /// One line for terminals and CI logs
    Summary,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Md => "md",
            OutputFormat::Summary => "summary",
        }
    }

    /// JSON-based formats; errors are reported as structured JSON too.
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Jsonl)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_names() {
        for format in [
            OutputFormat::Json,
            OutputFormat::Jsonl,
            OutputFormat::Md,
            OutputFormat::Summary,
        ] {
            let parsed = OutputFormat::from_str(format.as_str(), true).unwrap();
            assert_eq!(parsed, format);
        }
        assert!(OutputFormat::Jsonl.is_machine_readable());
        assert!(!OutputFormat::Md.is_machine_readable());
    }
}
