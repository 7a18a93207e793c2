//! Merge and dedupe operations over ledger rows.
//!
//! The odds ledger keys rows by `(event_name, event_time)` — one row per
//! fixture. The results ledger merge additionally keys on `parse_timestamp`,
//! so distinct scrape snapshots of the same fixture stay distinct. Both
//! policies come from the original feeds and are kept as-is.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::OddsRecord;

/// Per-fixture identity key: `(event_name, event_time)`.
#[must_use]
pub fn event_key(row: &OddsRecord) -> (String, String) {
    (row.event_name.clone(), row.event_time.clone())
}

/// Per-snapshot identity key: `(event_name, event_time, parse_timestamp)`.
#[must_use]
pub fn snapshot_key(row: &OddsRecord) -> (String, String, String) {
    (
        row.event_name.clone(),
        row.event_time.clone(),
        row.parse_timestamp.clone(),
    )
}

/// Drops duplicate rows by fixture key, first seen wins. Order of first
/// occurrences is preserved.
#[must_use]
pub fn dedupe(rows: Vec<OddsRecord>) -> Vec<OddsRecord> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(event_key(row)))
        .collect()
}

/// Merges freshly loaded rows into the existing results ledger without
/// losing settled outcomes.
///
/// Keyed by snapshot key. For a key present on both sides the existing row
/// wins if it is already settled, otherwise the new row replaces it. Keys
/// only present in `new` are taken as-is; keys only present in `existing`
/// are kept (appended after the new ordering). Running the merge again over
/// its own output with the same input is a no-op.
#[must_use]
pub fn merge_preserving_results(
    existing: Vec<OddsRecord>,
    new: Vec<OddsRecord>,
) -> Vec<OddsRecord> {
    let mut existing_by_key: HashMap<(String, String, String), usize> = HashMap::new();
    for (i, row) in existing.iter().enumerate() {
        existing_by_key.entry(snapshot_key(row)).or_insert(i);
    }

    let mut matched: HashSet<usize> = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len().max(new.len()));
    let mut kept_settled = 0usize;

    for new_row in new {
        match existing_by_key.get(&snapshot_key(&new_row)) {
            Some(&i) => {
                matched.insert(i);
                if existing[i].is_settled() {
                    kept_settled += 1;
                    merged.push(existing[i].clone());
                } else {
                    merged.push(new_row);
                }
            }
            None => merged.push(new_row),
        }
    }

    // Rows that disappeared from the input ledger are still history; keep them.
    for (i, row) in existing.into_iter().enumerate() {
        if !matched.contains(&i) {
            merged.push(row);
        }
    }

    debug!(
        merged = merged.len(),
        kept_settled, "merged ledger rows, settled rows preserved"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, time: &str, stamp: &str) -> OddsRecord {
        OddsRecord {
            parse_timestamp: stamp.to_string(),
            event_name: name.to_string(),
            event_time: time.to_string(),
            odds_1: "2.10".to_string(),
            odds_x: "4.20".to_string(),
            odds_2: "3.05".to_string(),
            ..OddsRecord::default()
        }
    }

    fn settled_row(name: &str, time: &str, stamp: &str) -> OddsRecord {
        let mut r = row(name, time, stamp);
        r.odds_1 = "WIN 2.10".to_string();
        r.odds_x = "LOSS 4.20".to_string();
        r.odds_2 = "LOSS 3.05".to_string();
        r.match_result = "3:2".to_string();
        r
    }

    // ==================== Dedupe Tests ====================

    #[test]
    fn test_dedupe_first_seen_wins() {
        let first = row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        let mut duplicate = row("А — Б", "09.10.2024 19:30", "08.10.2024 12:00:00");
        duplicate.odds_1 = "2.50".to_string();
        let other = row("В — Г", "09.10.2024 17:00", "08.10.2024 10:00:00");

        let unique = dedupe(vec![first.clone(), duplicate, other.clone()]);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], first);
        assert_eq!(unique[1], other);
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_keeps_settled_existing() {
        let settled = settled_row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        let rescrape = row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");

        let merged = merge_preserving_results(vec![settled.clone()], vec![rescrape]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0], settled);
    }

    #[test]
    fn test_merge_prefers_new_when_unsettled() {
        let old = row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        let mut fresh = row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        fresh.odds_1 = "2.40".to_string();

        let merged = merge_preserving_results(vec![old], vec![fresh.clone()]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0], fresh);
    }

    #[test]
    fn test_merge_appends_new_and_keeps_existing_only() {
        let existing_only = settled_row("А — Б", "07.10.2024 19:30", "06.10.2024 10:00:00");
        let brand_new = row("В — Г", "09.10.2024 17:00", "08.10.2024 10:00:00");

        let merged = merge_preserving_results(vec![existing_only.clone()], vec![brand_new.clone()]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], brand_new);
        assert_eq!(merged[1], existing_only);
    }

    #[test]
    fn test_merge_never_downgrades_settled() {
        let settled = settled_row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        let rescrape = row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");

        let merged = merge_preserving_results(vec![settled], vec![rescrape]);
        assert!(merged.iter().all(OddsRecord::is_settled));
    }

    #[test]
    fn test_merge_is_idempotent_once_settled() {
        let settled = settled_row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        let input = vec![row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00")];

        let once = merge_preserving_results(vec![settled], input.clone());
        let twice = merge_preserving_results(once.clone(), input);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_distinguishes_snapshots() {
        let snapshot_a = settled_row("А — Б", "09.10.2024 19:30", "08.10.2024 10:00:00");
        let snapshot_b = row("А — Б", "09.10.2024 19:30", "08.10.2024 14:00:00");

        let merged = merge_preserving_results(vec![snapshot_a], vec![snapshot_b]);

        // Distinct parse timestamps are distinct rows in the results ledger.
        assert_eq!(merged.len(), 2);
    }
}
