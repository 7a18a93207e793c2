//! Settlement eligibility and outcome labeling.

use chrono::{Duration, NaiveDateTime};

use puckline_core::config::ReconcileConfig;
use puckline_core::timeparse::parse_event_time;
use puckline_ledger::{OddsRecord, Outcome, ScoreLine};

/// The window inside which a pending row may settle, relative to the event
/// start: matches run about two to three hours, so settlement waits two
/// hours; after three days a result page is no longer worth scraping.
#[derive(Debug, Clone, Copy)]
pub struct SettlementWindow {
    pub min_age: Duration,
    pub max_age: Duration,
}

impl Default for SettlementWindow {
    fn default() -> Self {
        Self {
            min_age: Duration::hours(2),
            max_age: Duration::days(3),
        }
    }
}

impl SettlementWindow {
    #[must_use]
    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self {
            min_age: Duration::hours(config.min_age_hours),
            max_age: Duration::days(config.max_age_days),
        }
    }
}

/// Where a pending row sits relative to the settlement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Event has not started yet.
    Future,
    /// Started less than the minimum age ago; likely still in progress.
    InProgress,
    /// Started more than the maximum age ago; abandoned.
    Stale,
    /// Inside the window; a result should exist.
    Eligible,
    /// The stored event time never resolved to a timestamp.
    Unparsable,
}

/// Assesses a stored event time against the settlement window.
#[must_use]
pub fn assess(event_time: &str, now: NaiveDateTime, window: &SettlementWindow) -> Eligibility {
    let Some(start) = parse_event_time(event_time) else {
        return Eligibility::Unparsable;
    };
    if start > now {
        return Eligibility::Future;
    }
    let age = now - start;
    if age > window.max_age {
        return Eligibility::Stale;
    }
    if age < window.min_age {
        return Eligibility::InProgress;
    }
    Eligibility::Eligible
}

/// Labels a pending row with the outcome derived from a match result.
///
/// Regulation results label the winning side; overtime and shootout results
/// count as draws at regulation, so X wins regardless of who took the extra
/// period, and the winning team's name is annotated onto the event name.
/// Totals settle against `total_value` (or the default line when that field
/// is missing or non-numeric); an exact hit labels both over and under WIN.
pub fn apply_score(record: &mut OddsRecord, score: &ScoreLine, default_total_line: f64) {
    use std::cmp::Ordering;

    if score.is_extra_time() {
        record.odds_1 = Outcome::Loss.mark(&record.odds_1);
        record.odds_x = Outcome::Win.mark(&record.odds_x);
        record.odds_2 = Outcome::Loss.mark(&record.odds_2);

        if let Some(winner) = &score.winner {
            if !record.event_name.contains(winner.as_str()) {
                record.event_name = format!("{} ({})", record.event_name, winner);
            }
        }
    } else {
        let (one, draw, two) = match score.home.cmp(&score.away) {
            Ordering::Greater => (Outcome::Win, Outcome::Loss, Outcome::Loss),
            Ordering::Less => (Outcome::Loss, Outcome::Loss, Outcome::Win),
            Ordering::Equal => (Outcome::Loss, Outcome::Win, Outcome::Loss),
        };
        record.odds_1 = one.mark(&record.odds_1);
        record.odds_x = draw.mark(&record.odds_x);
        record.odds_2 = two.mark(&record.odds_2);
    }

    let total_score = f64::from(score.total());
    let line = record
        .total_value
        .trim()
        .parse::<f64>()
        .unwrap_or(default_total_line);

    if total_score > line {
        record.total_over = Outcome::Win.mark(&record.total_over);
        record.total_under = Outcome::Loss.mark(&record.total_under);
    } else if total_score < line {
        record.total_over = Outcome::Loss.mark(&record.total_over);
        record.total_under = Outcome::Win.mark(&record.total_under);
    } else {
        record.total_over = Outcome::Win.mark(&record.total_over);
        record.total_under = Outcome::Win.mark(&record.total_under);
    }

    record.match_result = score.to_string();
}
