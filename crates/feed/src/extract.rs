//! Event extraction from parsed pages.
//!
//! Both extractors work through prioritized selector strategies: each field
//! has an ordered list of queries and the first one that yields usable
//! content wins. A miss on a single event never fails the batch — the event
//! is skipped and logged.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use puckline_core::timeparse::{format_parse_timestamp, resolve_event_time};
use puckline_core::{League, ScoreAdjust};
use puckline_ledger::{dedupe, Finish, OddsRecord, ScoreLine};

use crate::page::{first_non_empty_text, PageNode, Query, Selector};

/// Default total line for hockey, used by the positional fallback when the
/// page exposes no explicit total parameter.
const FALLBACK_TOTAL_LINE: &str = "5.5";

fn name_queries() -> Vec<Query> {
    vec![
        Query::one(Selector::tag_class("a", "sport-event__name")),
        Query::one(Selector::tag_class("div", "event-name")),
        Query::one(Selector::tag_class("span", "event-name")),
    ]
}

fn time_queries() -> Vec<Query> {
    vec![
        Query::one(Selector::tag_class("span", "event-block-planned-time")),
        Query::one(Selector::tag_class("span", "time")),
        Query::one(Selector::tag_class("div", "time")),
    ]
}

fn event_block_queries() -> Vec<Query> {
    vec![
        Query::one(Selector::class("sport-base-event")),
        Query::one(Selector::class("sport-event")),
        Query::one(Selector::class("event-block")),
        Query::one(Selector::class("sport-base-event--")),
    ]
}

fn team_name_queries() -> Vec<Query> {
    vec![
        Query::chain(vec![
            Selector::tag_class("div", "results-event-team__name--"),
            Selector::tag_class("div", "overflowed-text--"),
        ]),
        Query::one(Selector::tag_class("div", "results-event-team__caption--")),
        Query::one(Selector::tag_class("div", "event-team__name")),
    ]
}

fn value_cell() -> Selector {
    Selector::tag_class("span", "value--")
}

fn param_cell() -> Selector {
    Selector::tag_class("span", "param--")
}

fn score_cell() -> Selector {
    Selector::tag_class("div", "results-scoreBlock__score--")
}

/// Strips the non-breaking space family the site pads parameters with.
fn clean_param(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{00a0}' | '\u{2009}' | '\u{202f}'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Extracts one odds row from an event element.
///
/// Quote layout is positional: the first three simple values are {1, X, 2},
/// the next three {1X, 12, X2}. Handicaps and totals come from structured
/// sub-elements, with a positional fallback over the flat value list when
/// the structure is absent but at least nine values are present (a
/// heuristic, not authoritative). Returns `None` on structural failure.
#[must_use]
pub fn extract_odds(event: &PageNode, now: NaiveDateTime) -> Option<OddsRecord> {
    let Some(event_name) = first_non_empty_text(event, &name_queries()) else {
        debug!("event element has no name, skipping");
        return None;
    };
    let Some(raw_time) = first_non_empty_text(event, &time_queries()) else {
        debug!(event = %event_name, "event element has no time, skipping");
        return None;
    };
    let event_time = resolve_event_time(&raw_time, now);

    let simple_values: Vec<String> = event
        .select(&value_cell())
        .iter()
        .map(|n| n.full_text())
        .collect();

    let pick = |i: usize| simple_values.get(i).cloned().unwrap_or_default();
    let (odds_1, odds_x, odds_2) = if simple_values.len() >= 3 {
        (pick(0), pick(1), pick(2))
    } else {
        (String::new(), String::new(), String::new())
    };
    let (odds_1x, odds_12, odds_x2) = if simple_values.len() >= 6 {
        (pick(3), pick(4), pick(5))
    } else {
        (String::new(), String::new(), String::new())
    };

    // Handicaps: complex factor blocks, by encounter order.
    let mut fora_1 = String::new();
    let mut fora_2 = String::new();
    let complex_blocks =
        event.select(&Selector::tag_class("div", "table-component-factor-value_complex"));
    for (i, block) in complex_blocks.iter().enumerate() {
        let params = block.select(&param_cell());
        let values = block.select(&value_cell());
        if let (Some(param), Some(value)) = (params.first(), values.first()) {
            let formatted = format!("{} {}", clean_param(&param.full_text()), value.full_text());
            match i {
                0 => fora_1 = formatted,
                1 => fora_2 = formatted,
                _ => {}
            }
        }
    }

    // Totals: the param block plus the two factor cells right after it.
    let mut total_value = String::new();
    let mut total_over = String::new();
    let mut total_under = String::new();
    let all_factors = event.select(&Selector::tag_class("div", "factor-value--"));
    for block in event.select(&Selector::tag_class("div", "table-component-factor-value_param")) {
        let Some(param) = block.select(&param_cell()).into_iter().next() else {
            continue;
        };
        total_value = clean_param(&param.full_text());

        if let Some(idx) = all_factors
            .iter()
            .position(|factor| std::ptr::eq(*factor, block))
        {
            if let Some(cell) = all_factors.get(idx + 1) {
                if let Some(value) = cell.select_first(&value_cell()) {
                    total_over = value.full_text();
                }
            }
            if let Some(cell) = all_factors.get(idx + 2) {
                if let Some(value) = cell.select_first(&value_cell()) {
                    total_under = value.full_text();
                }
            }
        }
    }

    // Positional fallback: positions 6-7 are handicaps, 8-9 the total quotes.
    if fora_1.is_empty() && fora_2.is_empty() && simple_values.len() >= 9 {
        fora_1 = pick(6);
        fora_2 = pick(7);
        total_value = FALLBACK_TOTAL_LINE.to_string();
        total_over = pick(8);
        if simple_values.len() > 9 {
            total_under = pick(9);
        }
    }

    Some(OddsRecord {
        parse_timestamp: format_parse_timestamp(now),
        event_name,
        event_time,
        odds_1,
        odds_x,
        odds_2,
        odds_1x,
        odds_12,
        odds_x2,
        fora_1,
        fora_2,
        total_value,
        total_over,
        total_under,
        match_result: String::new(),
    })
}

/// Extracts all odds rows for a league from an odds page.
///
/// Event-block strategies are tried in order; the first strategy producing
/// any league fixture wins. Rows are filtered by the league's known team
/// names and deduped first-seen by `(event_name, event_time)`.
#[must_use]
pub fn extract_all_odds(page: &PageNode, league: League, now: NaiveDateTime) -> Vec<OddsRecord> {
    for query in &event_block_queries() {
        let blocks = query.select(page);
        if blocks.is_empty() {
            continue;
        }
        debug!(blocks = blocks.len(), "found candidate event blocks");

        let mut rows = Vec::new();
        for block in blocks {
            let Some(record) = extract_odds(block, now) else {
                continue;
            };
            let is_league_fixture = league
                .known_teams()
                .iter()
                .any(|team| record.event_name.contains(team));
            if is_league_fixture {
                rows.push(record);
            }
        }

        if !rows.is_empty() {
            let unique = dedupe(rows);
            info!(league = %league, rows = unique.len(), "extracted odds rows");
            return unique;
        }
    }

    warn!(league = %league, "no odds rows extracted from page");
    Vec::new()
}

/// Extracts one match result from a results-page event element.
///
/// Returns both name-order keys (`"A — B"` and `"B — A"`) together with the
/// score. `None` when teams or a numeric score cannot be located.
#[must_use]
pub fn extract_result(
    event: &PageNode,
    adjust: ScoreAdjust,
) -> Option<((String, String), ScoreLine)> {
    let mut teams: Vec<String> = Vec::new();
    for query in &team_name_queries() {
        let nodes = query.select(event);
        if nodes.len() >= 2 {
            teams = nodes[..2].iter().map(|n| n.full_text()).collect();
            break;
        }
    }
    if teams.len() < 2 {
        return None;
    }
    let team1 = teams[0].clone();
    let team2 = teams[1].clone();
    let key_pair = (
        format!("{team1} — {team2}"),
        format!("{team2} — {team1}"),
    );

    // Overtime/shootout indicator block: the sub-events score block carries
    // the marker on one side, the winning side's cell.
    let mut finish = Finish::Regulation;
    let mut winner: Option<String> = None;
    let indicator_block =
        Selector::tag_class("div", "results-scoreBlock--").and_class("sum-subEvents--");
    for block in event.select(&indicator_block) {
        let cells = block.select(&score_cell());
        if cells.len() < 2 {
            continue;
        }
        let left = cells[0].full_text();
        let right = cells[1].full_text();

        let marker = if matches!(left.as_str(), "OT" | "ОТ") || matches!(right.as_str(), "OT" | "ОТ")
        {
            Some(Finish::Overtime)
        } else if matches!(left.as_str(), "Б" | "B") || matches!(right.as_str(), "Б" | "B") {
            Some(Finish::Shootout)
        } else {
            None
        };

        if let Some(found) = marker {
            finish = found;
            winner = if !left.is_empty() && right.is_empty() {
                Some(team1.clone())
            } else if !right.is_empty() && left.is_empty() {
                Some(team2.clone())
            } else {
                None
            };
            break;
        }
    }

    // Final score: three strategies, last two matched cells, digits only.
    let score_strategies = [
        Selector::tag_class("div", "results-scoreBlock__score--")
            .and_class("_summary--")
            .and_class("_bold--"),
        Selector::tag_class("div", "scoreBlock__score").and_class("_summary"),
        Selector::tag_class("div", "results-scoreBlock__score--"),
    ];

    let mut scores: Option<(u32, u32)> = None;
    for selector in &score_strategies {
        let cells = event.select(selector);
        if cells.len() < 2 {
            continue;
        }
        let left = cells[cells.len() - 2].full_text();
        let right = cells[cells.len() - 1].full_text();
        if all_digits(&left) && all_digits(&right) {
            scores = Some((left.parse().ok()?, right.parse().ok()?));
            break;
        }
    }

    // Last resort: the final score block is usually the last one.
    if scores.is_none() {
        let blocks = event.select(&Selector::tag_class("div", "results-scoreBlock--"));
        if let Some(last) = blocks.last() {
            let cells = last.select(&score_cell());
            if cells.len() >= 2 {
                let left = cells[0].full_text();
                let right = cells[1].full_text();
                if all_digits(&left) && all_digits(&right) {
                    scores = Some((left.parse().ok()?, right.parse().ok()?));
                }
            }
        }
    }

    let (mut home, mut away) = scores?;

    if finish != Finish::Regulation && adjust == ScoreAdjust::SubtractWinnerGoal {
        // The feed shows the post-overtime score; roll back the deciding goal.
        if home > away {
            home -= 1;
        } else if away > home {
            away -= 1;
        }
    }

    let score = if finish == Finish::Regulation {
        ScoreLine::regulation(home, away)
    } else {
        ScoreLine::extra_time(home, away, finish, winner)
    };

    Some((key_pair, score))
}

/// Extracts every result on a results page, keyed by both name orders.
#[must_use]
pub fn extract_all_results(page: &PageNode, adjust: ScoreAdjust) -> HashMap<String, ScoreLine> {
    let events = page.select(&Selector::tag_class("div", "results-event--"));
    debug!(events = events.len(), "events found on results page");

    let mut results = HashMap::new();
    for event in events {
        if let Some(((forward, reverse), score)) = extract_result(event, adjust) {
            debug!(key = %forward, result = %score, "parsed match result");
            results.insert(forward, score.clone());
            results.insert(reverse, score);
        }
    }

    info!(results = results.len() / 2, "results parsed from page");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn value_span(text: &str) -> PageNode {
        PageNode::new("span").with_class("value--OUKql").with_text(text)
    }

    fn param_span(text: &str) -> PageNode {
        PageNode::new("span").with_class("param--qbIN_").with_text(text)
    }

    fn odds_event(name: &str, time: &str) -> PageNode {
        PageNode::new("div")
            .with_class("sport-base-event--W4qkO")
            .with_child(
                PageNode::new("a")
                    .with_class("sport-event__name--K9PGV")
                    .with_text(name),
            )
            .with_child(
                PageNode::new("span")
                    .with_class("event-block-planned-time--P2HVH")
                    .with_text(time),
            )
    }

    fn with_main_odds(event: PageNode) -> PageNode {
        event
            .with_child(value_span("2.10"))
            .with_child(value_span("4.20"))
            .with_child(value_span("3.05"))
            .with_child(value_span("1.45"))
            .with_child(value_span("1.25"))
            .with_child(value_span("1.75"))
    }

    fn score_div(text: &str) -> PageNode {
        PageNode::new("div")
            .with_class("results-scoreBlock__score--XvlMM")
            .with_text(text)
    }

    fn summary_score_div(text: &str) -> PageNode {
        PageNode::new("div")
            .with_class("results-scoreBlock__score--XvlMM")
            .with_class("_summary--Jt8Ej")
            .with_class("_bold--JaGTY")
            .with_text(text)
    }

    fn team_div(name: &str) -> PageNode {
        PageNode::new("div")
            .with_class("results-event-team__name--lRkNU")
            .with_child(
                PageNode::new("div")
                    .with_class("overflowed-text--JHSWr")
                    .with_text(name),
            )
    }

    fn result_event(team1: &str, team2: &str, s1: &str, s2: &str) -> PageNode {
        PageNode::new("div")
            .with_class("results-event--Me6XJ")
            .with_child(team_div(team1))
            .with_child(team_div(team2))
            .with_child(
                PageNode::new("div")
                    .with_class("results-scoreBlock--aHrej")
                    .with_child(summary_score_div(s1))
                    .with_child(summary_score_div(s2)),
            )
    }

    fn overtime_event(team1: &str, team2: &str, s1: &str, s2: &str, marker: &str) -> PageNode {
        result_event(team1, team2, s1, s2).with_child(
            PageNode::new("div")
                .with_class("results-scoreBlock--aHrej")
                .with_class("results-scoreBoard__sum-subEvents--_LZ3a")
                .with_child(score_div(marker))
                .with_child(score_div("")),
        )
    }

    // ==================== Odds Extraction Tests ====================

    #[test]
    fn test_extract_odds_positional_quotes() {
        let event = with_main_odds(odds_event("Ак Барс — Спартак", "Сегодня в 19:30"));
        let record = extract_odds(&event, now()).unwrap();

        assert_eq!(record.event_name, "Ак Барс — Спартак");
        assert_eq!(record.event_time, "09.10.2024 19:30");
        assert_eq!(record.odds_1, "2.10");
        assert_eq!(record.odds_x, "4.20");
        assert_eq!(record.odds_2, "3.05");
        assert_eq!(record.odds_1x, "1.45");
        assert_eq!(record.odds_12, "1.25");
        assert_eq!(record.odds_x2, "1.75");
        assert!(record.match_result.is_empty());
    }

    #[test]
    fn test_extract_odds_unresolved_time_kept_raw() {
        let event = with_main_odds(odds_event("Ак Барс — Спартак", "Матч дня"));
        let record = extract_odds(&event, now()).unwrap();
        assert_eq!(record.event_time, "Матч дня");
    }

    #[test]
    fn test_extract_odds_structured_fora_and_total() {
        let complex = |param: &str, value: &str| {
            PageNode::new("div")
                .with_class("factor-value--zrkpK")
                .with_class("table-component-factor-value_complex")
                .with_child(param_span(param))
                .with_child(value_span(value))
        };
        let plain_factor = |value: &str| {
            PageNode::new("div")
                .with_class("factor-value--zrkpK")
                .with_child(value_span(value))
        };
        let total_param = PageNode::new("div")
            .with_class("factor-value--zrkpK")
            .with_class("table-component-factor-value_param")
            .with_child(param_span("5.5"));

        let event = with_main_odds(odds_event("Ак Барс — Спартак", "Сегодня в 19:30"))
            .with_child(complex("(-1.5)", "2.60"))
            .with_child(complex("(+1.5)", "1.50"))
            .with_child(total_param)
            .with_child(plain_factor("1.90"))
            .with_child(plain_factor("1.85"));

        let record = extract_odds(&event, now()).unwrap();
        assert_eq!(record.fora_1, "(-1.5) 2.60");
        assert_eq!(record.fora_2, "(+1.5) 1.50");
        assert_eq!(record.total_value, "5.5");
        assert_eq!(record.total_over, "1.90");
        assert_eq!(record.total_under, "1.85");
    }

    #[test]
    fn test_extract_odds_positional_fallback() {
        let event = with_main_odds(odds_event("Ак Барс — Спартак", "Сегодня в 19:30"))
            .with_child(value_span("2.60"))
            .with_child(value_span("1.50"))
            .with_child(value_span("1.90"))
            .with_child(value_span("1.85"));

        let record = extract_odds(&event, now()).unwrap();
        assert_eq!(record.fora_1, "2.60");
        assert_eq!(record.fora_2, "1.50");
        assert_eq!(record.total_value, "5.5");
        assert_eq!(record.total_over, "1.90");
        assert_eq!(record.total_under, "1.85");
    }

    #[test]
    fn test_extract_odds_missing_name_is_none() {
        let event = PageNode::new("div").with_child(value_span("2.10"));
        assert!(extract_odds(&event, now()).is_none());
    }

    #[test]
    fn test_extract_all_odds_filters_and_dedupes() {
        let page = PageNode::new("div")
            .with_child(with_main_odds(odds_event("Ак Барс — Спартак", "Сегодня в 19:30")))
            .with_child(with_main_odds(odds_event("Ак Барс — Спартак", "Сегодня в 19:30")))
            .with_child(with_main_odds(odds_event("Сборная мира — Сборная звёзд", "Сегодня в 21:00")));

        let rows = extract_all_odds(&page, League::Khl, now());

        // The exhibition fixture is filtered out, the duplicate collapsed.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_name, "Ак Барс — Спартак");
    }

    #[test]
    fn test_extract_all_odds_empty_page() {
        let page = PageNode::new("div");
        assert!(extract_all_odds(&page, League::Khl, now()).is_empty());
    }

    // ==================== Result Extraction Tests ====================

    #[test]
    fn test_extract_result_regulation() {
        let event = result_event("Ак Барс", "Спартак", "3", "2");
        let ((forward, reverse), score) = extract_result(&event, ScoreAdjust::None).unwrap();

        assert_eq!(forward, "Ак Барс — Спартак");
        assert_eq!(reverse, "Спартак — Ак Барс");
        assert_eq!(score, ScoreLine::regulation(3, 2));
    }

    #[test]
    fn test_extract_result_overtime_with_winner() {
        let event = overtime_event("Ак Барс", "Спартак", "3", "2", "ОТ");
        let (_, score) = extract_result(&event, ScoreAdjust::None).unwrap();

        assert_eq!(score.finish, Finish::Overtime);
        assert_eq!(score.winner.as_deref(), Some("Ак Барс"));
        assert_eq!((score.home, score.away), (3, 2));
    }

    #[test]
    fn test_extract_result_shootout_marker() {
        let event = overtime_event("СКА", "ЦСКА", "2", "1", "Б");
        let (_, score) = extract_result(&event, ScoreAdjust::None).unwrap();
        assert_eq!(score.finish, Finish::Shootout);
    }

    #[test]
    fn test_extract_result_subtracts_winner_goal() {
        let event = overtime_event("Рейнджерс", "Бостон", "4", "3", "OT");
        let (_, score) = extract_result(&event, ScoreAdjust::SubtractWinnerGoal).unwrap();

        // 4:3 after overtime means 3:3 at regulation.
        assert_eq!((score.home, score.away), (3, 3));
    }

    #[test]
    fn test_extract_result_regulation_not_adjusted() {
        let event = result_event("Рейнджерс", "Бостон", "4", "1");
        let (_, score) = extract_result(&event, ScoreAdjust::SubtractWinnerGoal).unwrap();
        assert_eq!((score.home, score.away), (4, 1));
    }

    #[test]
    fn test_extract_result_rejects_non_numeric_score() {
        let event = result_event("Ак Барс", "Спартак", "—", "—");
        assert!(extract_result(&event, ScoreAdjust::None).is_none());
    }

    #[test]
    fn test_extract_result_needs_two_teams() {
        let event = PageNode::new("div")
            .with_class("results-event--Me6XJ")
            .with_child(team_div("Ак Барс"));
        assert!(extract_result(&event, ScoreAdjust::None).is_none());
    }

    #[test]
    fn test_extract_all_results_inserts_both_orders() {
        let page = PageNode::new("div")
            .with_child(result_event("Ак Барс", "Спартак", "3", "2"))
            .with_child(result_event("СКА", "ЦСКА", "1", "1"));

        let results = extract_all_results(&page, ScoreAdjust::None);

        assert_eq!(results.len(), 4);
        assert_eq!(
            results.get("Ак Барс — Спартак"),
            Some(&ScoreLine::regulation(3, 2))
        );
        assert_eq!(
            results.get("Спартак — Ак Барс"),
            Some(&ScoreLine::regulation(3, 2))
        );
    }
}
