//! The odds row model.
//!
//! One row per scraped fixture. Quote fields hold the raw numeric quote
//! while the match is open; settlement prefixes the outcome fields with
//! `WIN`/`LOSS` and fills `match_result`, after which the row is immutable.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use puckline_core::timeparse::parse_event_time;

/// Column order of the odds ledger as scraped (no result column yet).
pub const ODDS_FIELDS: [&str; 14] = [
    "parse_timestamp",
    "event_name",
    "event_time",
    "odds_1",
    "odds_x",
    "odds_2",
    "odds_1x",
    "odds_12",
    "odds_x2",
    "fora_1",
    "fora_2",
    "total_value",
    "total_over",
    "total_under",
];

/// Column order of the results ledger (`match_result` appended on first
/// settlement run).
pub const ALL_FIELDS: [&str; 15] = [
    "parse_timestamp",
    "event_name",
    "event_time",
    "odds_1",
    "odds_x",
    "odds_2",
    "odds_1x",
    "odds_12",
    "odds_x2",
    "fora_1",
    "fora_2",
    "total_value",
    "total_over",
    "total_under",
    "match_result",
];

/// Outcome label attached to a quote at settlement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    /// The marker written into the ledger.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Loss => "LOSS",
        }
    }

    /// Prefixes a raw quote with this outcome, e.g. `"WIN 2.15"`.
    #[must_use]
    pub fn mark(self, quote: &str) -> String {
        format!("{} {}", self.label(), quote)
    }
}

/// A single odds ledger row. All fields are ledger strings; quotes keep the
/// exact text the site showed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub parse_timestamp: String,
    pub event_name: String,
    pub event_time: String,
    pub odds_1: String,
    pub odds_x: String,
    pub odds_2: String,
    pub odds_1x: String,
    pub odds_12: String,
    pub odds_x2: String,
    pub fora_1: String,
    pub fora_2: String,
    pub total_value: String,
    pub total_over: String,
    pub total_under: String,
    #[serde(default)]
    pub match_result: String,
}

impl OddsRecord {
    /// Field value by ledger column name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "parse_timestamp" => &self.parse_timestamp,
            "event_name" => &self.event_name,
            "event_time" => &self.event_time,
            "odds_1" => &self.odds_1,
            "odds_x" => &self.odds_x,
            "odds_2" => &self.odds_2,
            "odds_1x" => &self.odds_1x,
            "odds_12" => &self.odds_12,
            "odds_x2" => &self.odds_x2,
            "fora_1" => &self.fora_1,
            "fora_2" => &self.fora_2,
            "total_value" => &self.total_value,
            "total_over" => &self.total_over,
            "total_under" => &self.total_under,
            "match_result" => &self.match_result,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Sets a field by ledger column name. Returns false for unknown columns.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "parse_timestamp" => &mut self.parse_timestamp,
            "event_name" => &mut self.event_name,
            "event_time" => &mut self.event_time,
            "odds_1" => &mut self.odds_1,
            "odds_x" => &mut self.odds_x,
            "odds_2" => &mut self.odds_2,
            "odds_1x" => &mut self.odds_1x,
            "odds_12" => &mut self.odds_12,
            "odds_x2" => &mut self.odds_x2,
            "fora_1" => &mut self.fora_1,
            "fora_2" => &mut self.fora_2,
            "total_value" => &mut self.total_value,
            "total_over" => &mut self.total_over,
            "total_under" => &mut self.total_under,
            "match_result" => &mut self.match_result,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// True once the row carries a stored match result.
    #[must_use]
    pub fn has_result(&self) -> bool {
        !self.match_result.trim().is_empty()
    }

    /// True if any outcome field already carries a `WIN`/`LOSS` marker.
    #[must_use]
    pub fn has_outcome_marks(&self) -> bool {
        [
            &self.odds_1,
            &self.odds_x,
            &self.odds_2,
            &self.total_over,
            &self.total_under,
        ]
        .iter()
        .any(|field| {
            let upper = field.to_uppercase();
            upper.contains("WIN") || upper.contains("LOSS")
        })
    }

    /// True if this row has been settled and must never be re-labeled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.has_result() || self.has_outcome_marks()
    }

    /// Event start as a timestamp, if the stored time ever resolved.
    #[must_use]
    pub fn event_datetime(&self) -> Option<NaiveDateTime> {
        parse_event_time(&self.event_time)
    }

    /// Event start date, if the stored time ever resolved.
    #[must_use]
    pub fn event_date(&self) -> Option<NaiveDate> {
        self.event_datetime().map(|ts| ts.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_row() -> OddsRecord {
        OddsRecord {
            parse_timestamp: "08.10.2024 11:00:00".to_string(),
            event_name: "Ак Барс — Спартак".to_string(),
            event_time: "09.10.2024 19:30".to_string(),
            odds_1: "2.10".to_string(),
            odds_x: "4.20".to_string(),
            odds_2: "3.05".to_string(),
            total_value: "5.5".to_string(),
            total_over: "1.90".to_string(),
            total_under: "1.90".to_string(),
            ..OddsRecord::default()
        }
    }

    #[test]
    fn test_fresh_row_is_unsettled() {
        let row = open_row();
        assert!(!row.is_settled());
        assert!(!row.has_result());
        assert!(!row.has_outcome_marks());
    }

    #[test]
    fn test_result_marks_row_settled() {
        let mut row = open_row();
        row.match_result = "3:2".to_string();
        assert!(row.is_settled());
    }

    #[test]
    fn test_outcome_marks_alone_settle_row() {
        let mut row = open_row();
        row.odds_1 = Outcome::Win.mark("2.10");
        assert!(row.is_settled());
        assert!(!row.has_result());
    }

    #[test]
    fn test_outcome_mark_format() {
        assert_eq!(Outcome::Win.mark("2.15"), "WIN 2.15");
        assert_eq!(Outcome::Loss.mark("1.90"), "LOSS 1.90");
    }

    #[test]
    fn test_field_access_by_name() {
        let mut row = open_row();
        assert_eq!(row.get("odds_x"), Some("4.20"));
        assert!(row.set("match_result", "2:2".to_string()));
        assert_eq!(row.get("match_result"), Some("2:2"));
        assert!(!row.set("unknown_column", String::new()));
        assert_eq!(row.get("unknown_column"), None);
    }

    #[test]
    fn test_event_datetime_parses_ledger_format() {
        let row = open_row();
        let ts = row.event_datetime().unwrap();
        assert_eq!(ts.format("%d.%m.%Y %H:%M").to_string(), row.event_time);
    }

    #[test]
    fn test_event_datetime_none_for_raw_phrase() {
        let mut row = open_row();
        row.event_time = "Завтра в 19:30".to_string();
        assert!(row.event_datetime().is_none());
        assert!(row.event_date().is_none());
    }

    #[test]
    fn test_field_lists_cover_record() {
        let row = open_row();
        for field in ALL_FIELDS {
            assert!(row.get(field).is_some(), "missing accessor for {field}");
        }
        assert_eq!(ODDS_FIELDS.len() + 1, ALL_FIELDS.len());
    }
}
