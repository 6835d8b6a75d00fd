//! Observation window selection.
//!
//! A window is either computed from an anchor (the heaviest record for
//! `peak`, the newest record for `recent`) or supplied by the caller. The
//! result is a closed interval `[anchor - lookback, anchor]`, optionally
//! clamped into a domain.

use ah_common::{ActivationRecord, TimeRange, WindowMode};
use tracing::debug;

/// Pick the observation window for `records`.
///
/// Returns `None` when no filtering applies: `all` mode, an empty record
/// set, no record with a usable timestamp, or a window that clamping to
/// `domain` left empty.
pub fn select(
    records: &[ActivationRecord],
    mode: WindowMode,
    lookback_ms: i64,
    domain: Option<TimeRange>,
) -> Option<TimeRange> {
    let window = match mode {
        WindowMode::All => return None,
        WindowMode::Explicit { start, end } => TimeRange::new(start, end),
        WindowMode::Peak => {
            let anchor = peak_anchor(records)?;
            debug!(anchor, "peak window anchor");
            anchored(anchor, lookback_ms)
        }
        WindowMode::Recent => {
            let anchor = recent_anchor(records)?;
            debug!(anchor, "recent window anchor");
            anchored(anchor, lookback_ms)
        }
    };

    match domain {
        Some(domain) => {
            let clamped = window.clamp_to(&domain);
            if clamped.start > clamped.end {
                debug!(
                    start = window.start,
                    end = window.end,
                    domain_start = domain.start,
                    domain_end = domain.end,
                    "window lies outside domain"
                );
                return None;
            }
            Some(clamped)
        }
        None => Some(window),
    }
}

/// Timestamp of the heaviest record; the first one wins ties.
pub fn peak_anchor(records: &[ActivationRecord]) -> Option<i64> {
    let mut best: Option<(f64, i64)> = None;
    for record in records {
        let Some(ts) = record.order_ts() else {
            continue;
        };
        match best {
            Some((weight, _)) if record.weight <= weight => {}
            _ => best = Some((record.weight, ts)),
        }
    }
    best.map(|(_, ts)| ts)
}

/// Latest usable timestamp across `records`.
pub fn recent_anchor(records: &[ActivationRecord]) -> Option<i64> {
    records.iter().filter_map(ActivationRecord::order_ts).max()
}

fn anchored(anchor: i64, lookback_ms: i64) -> TimeRange {
    TimeRange::new(anchor.saturating_sub(lookback_ms.max(0)), anchor)
}

/// Records inside `window`.
///
/// Without a window every record is kept, including those without a
/// timestamp. With a window, only records whose ordering timestamp falls
/// inside it are kept.
pub fn filter_records<'a>(
    records: &'a [ActivationRecord],
    window: Option<&TimeRange>,
) -> Vec<&'a ActivationRecord> {
    match window {
        None => records.iter().collect(),
        Some(range) => records
            .iter()
            .filter(|r| r.order_ts().is_some_and(|ts| range.contains(ts)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_common::MS_PER_MINUTE;

    fn rec(ts: Option<i64>, weight: f64) -> ActivationRecord {
        ActivationRecord::new("FIC-100", ts, weight)
    }

    #[test]
    fn all_mode_never_filters() {
        let records = vec![rec(Some(0), 1.0)];
        assert_eq!(select(&records, WindowMode::All, 1000, None), None);
    }

    #[test]
    fn empty_input_has_no_window() {
        assert_eq!(select(&[], WindowMode::Peak, 1000, None), None);
        assert_eq!(select(&[], WindowMode::Recent, 1000, None), None);
    }

    #[test]
    fn peak_ties_keep_first_occurrence() {
        let records = vec![rec(Some(100), 7.0), rec(Some(900), 7.0), rec(Some(500), 2.0)];
        assert_eq!(peak_anchor(&records), Some(100));
    }

    #[test]
    fn peak_skips_records_without_timestamp() {
        let records = vec![rec(None, 99.0), rec(Some(42), 1.0)];
        assert_eq!(peak_anchor(&records), Some(42));
    }

    #[test]
    fn recent_uses_latest_timestamp() {
        let records = vec![rec(Some(5 * MS_PER_MINUTE), 1.0), rec(Some(MS_PER_MINUTE), 50.0)];
        let window = select(&records, WindowMode::Recent, 2 * MS_PER_MINUTE, None).unwrap();
        assert_eq!(window, TimeRange::new(3 * MS_PER_MINUTE, 5 * MS_PER_MINUTE));
    }

    #[test]
    fn explicit_range_is_returned_unchanged() {
        let mode = WindowMode::Explicit { start: 10, end: 20 };
        assert_eq!(select(&[], mode, 1000, None), Some(TimeRange::new(10, 20)));
    }

    #[test]
    fn domain_clamps_both_bounds() {
        let mode = WindowMode::Explicit { start: 0, end: 100 };
        let domain = TimeRange::new(20, 80);
        assert_eq!(select(&[], mode, 0, Some(domain)), Some(domain));
    }

    #[test]
    fn disjoint_domain_yields_none() {
        let mode = WindowMode::Explicit { start: 0, end: 10 };
        assert_eq!(select(&[], mode, 0, Some(TimeRange::new(50, 60))), None);
    }

    #[test]
    fn filter_keeps_untimestamped_only_without_window() {
        let records = vec![rec(Some(5), 1.0), rec(None, 1.0), rec(Some(50), 1.0)];
        assert_eq!(filter_records(&records, None).len(), 3);
        let kept = filter_records(&records, Some(&TimeRange::new(0, 10)));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].event_time, Some(5));
    }
}
