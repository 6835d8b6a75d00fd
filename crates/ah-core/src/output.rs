//! Payload rendering for the CLI.
//!
//! JSON is the canonical form. JSONL emits one item per line for list
//! payloads. Markdown and the one-line summary are for people.

use std::fmt::Write as _;

use ah_common::{format_timestamp, Result, TimeRange};
use serde::Serialize;

use crate::bad_actor::BadActor;
use crate::engine::AnalyticsReport;
use crate::flood::FloodWindow;
use crate::risk::RankedEntity;
use crate::topk::TopKResult;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One compact JSON document per item.
pub fn to_jsonl<T: Serialize>(items: &[T]) -> Result<String> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

fn fmt_range(range: Option<&TimeRange>) -> String {
    match range {
        Some(r) => format!("{} → {}", format_timestamp(r.start), format_timestamp(r.end)),
        None => "all records".to_string(),
    }
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

pub fn floods_markdown(floods: &[FloodWindow]) -> String {
    let mut out = String::from("| Window | Sources | Activations | Rate/min | Top sources |\n");
    out.push_str("|---|---:|---:|---:|---|\n");
    for flood in floods {
        let top = flood
            .top_sources
            .iter()
            .map(|s| format!("{} ({})", s.source, s.count))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} | {} |",
            fmt_range(Some(&flood.range())),
            flood.source_count,
            flood.flood_count,
            flood.rate_per_min,
            top
        );
    }
    out
}

pub fn risk_markdown(entities: &[RankedEntity]) -> String {
    let mut out = String::from("| Entity | Frequency | Severity | Score | Normalized |\n");
    out.push_str("|---|---:|---:|---:|---:|\n");
    for e in entities {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} | {:.1} |",
            e.key,
            fmt_num(e.frequency_count),
            fmt_num(e.severity_sum),
            e.composite_score,
            e.normalized_score
        );
    }
    out
}

pub fn bad_actors_markdown(actors: &[BadActor]) -> String {
    let mut out = String::from("| Source | Contribution | Floods involved |\n");
    out.push_str("|---|---:|---:|\n");
    for a in actors {
        let _ = writeln!(out, "| {} | {} | {} |", a.source, a.total_contribution, a.involvement_count);
    }
    out
}

/// Row totals with each row's largest series.
pub fn topk_markdown(result: &TopKResult, group_field: &str) -> String {
    let mut out = format!("| {group_field} | Total | Largest series |\n");
    out.push_str("|---|---:|---|\n");
    for row in &result.rows {
        let largest = row
            .by_subkey
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| format!("{k} ({})", fmt_num(*v)))
            .unwrap_or_default();
        let _ = writeln!(out, "| {} | {} | {} |", row.key, fmt_num(row.total), largest);
    }
    if let Some(rem) = &result.remainder {
        let _ = writeln!(out, "\n{} more groups totalling {}.", rem.groups, fmt_num(rem.total));
    }
    out
}

pub fn report_markdown(report: &AnalyticsReport) -> String {
    let mut out = String::from("# Alarm health report\n\n");
    let _ = writeln!(out, "- Generated: {}", report.generated_at.to_rfc3339());
    if let Some(id) = &report.config_id {
        let _ = writeln!(out, "- Config: `{id}`");
    }
    let _ = writeln!(
        out,
        "- Window ({}): {}",
        report.window_mode,
        fmt_range(report.window.as_ref())
    );
    let _ = writeln!(
        out,
        "- Records: {} ({} in window, {} without timestamp)",
        report.ingest.total, report.records_in_window, report.ingest.without_timestamp
    );
    match report.chart.threshold {
        Some(t) => {
            let _ = writeln!(
                out,
                "- Highlight threshold (p{:.0}): {} ({} cells)",
                report.chart.percentile * 100.0,
                fmt_num(t),
                report.chart.highlighted_cells
            );
        }
        None => out.push_str("- Highlight threshold: none\n"),
    }

    out.push_str("\n## Top groups\n\n");
    let _ = writeln!(out, "| {} | Total |", report.chart.group_field);
    out.push_str("|---|---:|\n");
    for row in &report.chart.rows {
        let key = row
            .get(&report.chart.group_field)
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let total = row.get("total").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let _ = writeln!(out, "| {} | {} |", key, fmt_num(total));
    }

    out.push_str("\n## Risk ranking\n\n");
    out.push_str(&risk_markdown(&report.risk));

    let s = &report.flood_summary;
    let _ = write!(
        out,
        "\n## Flood windows\n\n{} windows, {} activations, peak {:.2}/min\n\n",
        s.window_count, s.total_activations, s.peak_rate_per_min
    );
    if !report.floods.is_empty() {
        out.push_str(&floods_markdown(&report.floods));
    }

    out.push_str("\n## Bad actors\n\n");
    out.push_str(&bad_actors_markdown(&report.bad_actors));
    out
}

/// One line for terminals and CI logs.
pub fn report_summary(report: &AnalyticsReport) -> String {
    let top_risk = report.risk.first().map_or("-", |e| e.key.as_str());
    let top_actor = report.bad_actors.first().map_or("-", |a| a.source.as_str());
    format!(
        "records={} in_window={} window={} floods={} flood_activations={} top_risk={} top_bad_actor={}",
        report.ingest.total,
        report.records_in_window,
        report.window_mode,
        report.flood_summary.window_count,
        report.flood_summary.total_activations,
        top_risk,
        top_actor
    )
}
