//! Read-only presentation views over ledger rows.
//!
//! The schedule page shows unsettled fixtures, the results page settled
//! ones, both newest-first. Rows whose event time never resolved to a real
//! timestamp cannot be sorted and are excluded from both views.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::OddsRecord;

/// A row prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub event_name: String,
    pub event_time: String,
    /// Short display form, `dd.mm HH:MM`.
    pub formatted_time: String,
    pub match_result: String,
    /// True when the name carries an overtime/shootout winner annotation.
    pub is_overtime: bool,
    pub odds_1: String,
    pub odds_x: String,
    pub odds_2: String,
    pub total_value: String,
    pub total_over: String,
    pub total_under: String,
}

impl MatchView {
    fn from_row(row: &OddsRecord, ts: NaiveDateTime) -> Self {
        Self {
            event_name: row.event_name.clone(),
            event_time: row.event_time.clone(),
            formatted_time: ts.format("%d.%m %H:%M").to_string(),
            match_result: row.match_result.clone(),
            is_overtime: row.event_name.contains('(') && row.event_name.contains(')'),
            odds_1: row.odds_1.clone(),
            odds_x: row.odds_x.clone(),
            odds_2: row.odds_2.clone(),
            total_value: row.total_value.clone(),
            total_over: row.total_over.clone(),
            total_under: row.total_under.clone(),
        }
    }
}

/// Settled rows (those with a stored result), newest first.
#[must_use]
pub fn settled(rows: &[OddsRecord]) -> Vec<MatchView> {
    collect(rows, true)
}

/// Unsettled rows (still waiting on a result), newest first.
#[must_use]
pub fn unsettled(rows: &[OddsRecord]) -> Vec<MatchView> {
    collect(rows, false)
}

fn collect(rows: &[OddsRecord], want_result: bool) -> Vec<MatchView> {
    let mut items: Vec<(NaiveDateTime, MatchView)> = rows
        .iter()
        .filter(|row| row.has_result() == want_result)
        .filter_map(|row| {
            // Unparsable event times are silently excluded from the views.
            let ts = row.event_datetime()?;
            Some((ts, MatchView::from_row(row, ts)))
        })
        .collect();

    // Stable sort: rows sharing a timestamp keep their ledger order.
    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.into_iter().map(|(_, view)| view).collect()
}
