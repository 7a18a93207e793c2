//! Resolution of site-relative time phrases into ledger timestamps.
//!
//! The odds page labels event times as "Сегодня в 20:00", "Завтра в 19:30"
//! or "12 октября в 02:00". The ledger stores absolute timestamps with
//! minute precision in `dd.mm.yyyy HH:MM` form. Anything the resolver does
//! not recognize passes through unchanged — the caller must treat such a
//! value as an opaque timestamp.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

/// Ledger timestamp format for event times (minute precision).
pub const EVENT_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Ledger timestamp format for scrape timestamps (second precision).
pub const PARSE_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Genitive month names as they appear on the site.
const MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Formats an absolute event time the way the ledger stores it.
#[must_use]
pub fn format_event_time(ts: NaiveDateTime) -> String {
    ts.format(EVENT_TIME_FORMAT).to_string()
}

/// Formats a scrape timestamp the way the ledger stores it.
#[must_use]
pub fn format_parse_timestamp(ts: NaiveDateTime) -> String {
    ts.format(PARSE_TIMESTAMP_FORMAT).to_string()
}

/// Parses a ledger event time back into a timestamp.
///
/// Returns `None` for raw phrases that never resolved.
#[must_use]
pub fn parse_event_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), EVENT_TIME_FORMAT).ok()
}

/// Resolves a site-relative time phrase into `dd.mm.yyyy HH:MM`.
///
/// Recognized shapes:
/// - `"Завтра в HH:MM"` — tomorrow relative to `now`
/// - `"<day> <genitive-month> в HH:MM"` — current year
/// - `"Сегодня в HH:MM"` — today relative to `now`
///
/// Any other shape, and any parse failure inside a recognized shape, returns
/// the original phrase unchanged.
#[must_use]
pub fn resolve_event_time(raw: &str, now: NaiveDateTime) -> String {
    match try_resolve(raw, now) {
        Some(ts) => format_event_time(ts),
        None => raw.to_string(),
    }
}

fn try_resolve(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if raw.contains("Завтра") {
        let resolved = relative_day(raw, now.date() + Duration::days(1));
        if resolved.is_none() {
            warn!(raw, "could not parse tomorrow-relative time phrase");
        }
        return resolved;
    }

    let lower = raw.to_lowercase();
    if MONTHS.iter().any(|m| lower.contains(m)) {
        let resolved = day_and_month(raw, now.year());
        if resolved.is_none() {
            warn!(raw, "could not parse day-and-month time phrase");
        }
        return resolved;
    }

    if raw.contains("Сегодня") {
        let resolved = relative_day(raw, now.date());
        if resolved.is_none() {
            warn!(raw, "could not parse today-relative time phrase");
        }
        return resolved;
    }

    None
}

/// `"… в HH:MM"` anchored to a known date.
fn relative_day(raw: &str, date: NaiveDate) -> Option<NaiveDateTime> {
    let time_part = raw.split(" в ").nth(1)?;
    let time = NaiveTime::parse_from_str(time_part.trim(), "%H:%M").ok()?;
    Some(date.and_time(time))
}

/// `"<day> <genitive-month> в HH:MM"` in the given year.
fn day_and_month(raw: &str, year: i32) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    let day: u32 = parts.first()?.parse().ok()?;
    let month_name = parts.get(1)?.to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let time = NaiveTime::parse_from_str(parts.get(3)?, "%H:%M").ok()?;
    Some(NaiveDate::from_ymd_opt(year, month, day)?.and_time(time))
}
