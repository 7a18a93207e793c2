//! The result reconciliation run.
//!
//! Loads the odds ledger, merges it into the results ledger without losing
//! settled rows, then walks every pending row through the settlement state
//! machine: skip future/in-progress/stale rows, fetch one results page per
//! event date, match by exact key then fuzzy name, label outcomes and save.
//! Already-settled rows are never touched, so re-running is a no-op.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use puckline_core::{find_best_match, League};
use puckline_feed::{dump_debug_page, extract_all_results, PageProvider};
use puckline_ledger::{
    merge_preserving_results, CsvStore, LedgerFile, LedgerLock, StoreError,
};

use crate::settlement::{apply_score, assess, Eligibility, SettlementWindow};

/// What a reconciliation run did.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileReport {
    /// Rows in the results ledger after the merge.
    pub rows: usize,
    /// Pending rows inside the settlement window this run.
    pub eligible: usize,
    /// Rows settled this run.
    pub settled: usize,
    /// Rows skipped because they were already settled.
    pub skipped_settled: usize,
    /// Eligible rows left unsettled (no matching result yet).
    pub unresolved: usize,
}

/// Reconciles pending odds rows against scraped results.
pub struct Reconciler<'a> {
    provider: &'a dyn PageProvider,
    store: CsvStore,
    window: SettlementWindow,
    default_total_line: f64,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn PageProvider, store: CsvStore) -> Self {
        Self {
            provider,
            store,
            window: SettlementWindow::default(),
            default_total_line: 5.5,
        }
    }

    /// Overrides the settlement window.
    #[must_use]
    pub fn with_window(mut self, window: SettlementWindow) -> Self {
        self.window = window;
        self
    }

    /// Overrides the default total line.
    #[must_use]
    pub fn with_default_total_line(mut self, line: f64) -> Self {
        self.default_total_line = line;
        self
    }

    /// Runs one reconciliation for a league.
    ///
    /// # Errors
    ///
    /// Fails when the odds ledger is missing, when another run holds the
    /// results ledger lock, on a fatal session error, or when the results
    /// ledger cannot be written after retries. Per-date and per-event
    /// failures are logged and skipped, never fatal.
    pub async fn run(
        &self,
        league: League,
        data_dir: &Path,
        now: NaiveDateTime,
    ) -> Result<ReconcileReport> {
        let odds_path = data_dir.join(league.odds_file());
        let results_path = data_dir.join(league.results_file());

        let _lock = LedgerLock::acquire(&results_path)
            .with_context(|| format!("locking results ledger for {league}"))?;

        let input = self
            .store
            .load(&odds_path)
            .with_context(|| format!("loading odds ledger for {league}"))?;
        info!(league = %league, rows = input.rows.len(), "loaded odds ledger");

        let mut ledger = match self.store.load(&results_path) {
            Ok(existing) => {
                info!(league = %league, rows = existing.rows.len(), "merging into existing results ledger");
                LedgerFile {
                    fields: input.fields.clone(),
                    rows: merge_preserving_results(existing.rows, input.rows),
                }
            }
            Err(StoreError::NotFound { .. }) => {
                info!(league = %league, "results ledger does not exist yet, starting a new one");
                LedgerFile {
                    fields: input.fields.clone(),
                    rows: input.rows,
                }
            }
            Err(e) => return Err(e.into()),
        };
        ledger.ensure_result_column();

        let mut report = ReconcileReport {
            rows: ledger.rows.len(),
            ..ReconcileReport::default()
        };

        // One results-page fetch covers every pending event of that date.
        let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (i, row) in ledger.rows.iter().enumerate() {
            if row.is_settled() {
                report.skipped_settled += 1;
                continue;
            }
            match assess(&row.event_time, now, &self.window) {
                Eligibility::Eligible => {
                    if let Some(date) = row.event_date() {
                        by_date.entry(date).or_default().push(i);
                    }
                }
                Eligibility::Future => {
                    debug!(event = %row.event_name, time = %row.event_time, "event not started yet");
                }
                Eligibility::InProgress => {
                    info!(event = %row.event_name, time = %row.event_time, "started recently, likely still in progress");
                }
                Eligibility::Stale => {
                    info!(event = %row.event_name, time = %row.event_time, "older than the settlement window, abandoning");
                }
                Eligibility::Unparsable => {
                    warn!(event = %row.event_name, time = %row.event_time, "event time never resolved, cannot settle");
                }
            }
        }
        report.eligible = by_date.values().map(Vec::len).sum();
        info!(
            league = %league,
            eligible = report.eligible,
            dates = by_date.len(),
            "pending events grouped by date"
        );

        for (date, indices) in &by_date {
            let page = match self.provider.results_page(league, *date).await {
                Ok(page) => page,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(league = %league, date = %date, error = %e, "results page unavailable, skipping date");
                    report.unresolved += indices.len();
                    continue;
                }
            };

            let results = extract_all_results(&page, league.score_adjust());
            if results.is_empty() {
                warn!(league = %league, date = %date, "no results found for date, saving page for debugging");
                dump_debug_page(&data_dir.join(league.debug_page_file()), &page);
                report.unresolved += indices.len();
                continue;
            }

            let mut keys: Vec<&str> = results.keys().map(String::as_str).collect();
            keys.sort_unstable();

            for &i in indices {
                let row = &mut ledger.rows[i];
                if row.is_settled() {
                    report.skipped_settled += 1;
                    continue;
                }

                let matched = match results.get(&row.event_name) {
                    Some(score) => Some(score),
                    None => find_best_match(&row.event_name, keys.iter().copied())
                        .and_then(|key| results.get(key)),
                };

                match matched {
                    Some(score) => {
                        apply_score(row, score, self.default_total_line);
                        report.settled += 1;
                        info!(event = %row.event_name, result = %row.match_result, "event settled");
                    }
                    None => {
                        report.unresolved += 1;
                        warn!(
                            event = %row.event_name,
                            date = %date,
                            available = ?keys,
                            "no result matched for eligible event, will retry next run"
                        );
                    }
                }
            }
        }

        self.store
            .save(&results_path, &ledger)
            .with_context(|| format!("saving results ledger for {league}"))?;

        info!(
            league = %league,
            rows = report.rows,
            settled = report.settled,
            skipped_settled = report.skipped_settled,
            unresolved = report.unresolved,
            "reconciliation finished"
        );
        Ok(report)
    }
}
