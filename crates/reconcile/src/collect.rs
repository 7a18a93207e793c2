//! The odds-collection run.
//!
//! Scrapes the upcoming-fixtures page and appends previously unseen rows to
//! the odds ledger. Existing rows are never touched, so collection can run
//! as often as wanted.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{info, warn};

use puckline_core::League;
use puckline_feed::{dump_debug_page, extract_all_odds, PageProvider};
use puckline_ledger::{event_key, CsvStore, LedgerFile, LedgerLock, StoreError};

/// What an odds-collection run did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectReport {
    /// Rows in the ledger after the run.
    pub total: usize,
    /// Rows appended by this run.
    pub added: usize,
}

/// Runs one odds collection for a league.
///
/// # Errors
///
/// Fails when the page cannot be fetched, when another run holds the odds
/// ledger lock, or when the ledger cannot be written after retries.
pub async fn collect_odds(
    provider: &dyn PageProvider,
    store: &CsvStore,
    league: League,
    data_dir: &Path,
    now: NaiveDateTime,
) -> Result<CollectReport> {
    let odds_path = data_dir.join(league.odds_file());
    let _lock = LedgerLock::acquire(&odds_path)
        .with_context(|| format!("locking odds ledger for {league}"))?;

    let page = provider
        .odds_page(league)
        .await
        .with_context(|| format!("fetching odds page for {league}"))?;

    let scraped = extract_all_odds(&page, league, now);
    if scraped.is_empty() {
        warn!(league = %league, "odds page yielded no events, saving page for debugging");
        dump_debug_page(&data_dir.join(league.debug_page_file()), &page);
    }

    let mut ledger = match store.load(&odds_path) {
        Ok(existing) => existing,
        Err(StoreError::NotFound { .. }) => {
            info!(league = %league, "odds ledger does not exist yet, starting a new one");
            LedgerFile::empty_odds()
        }
        Err(e) => return Err(e.into()),
    };

    let existing_keys: HashSet<(String, String)> = ledger.rows.iter().map(event_key).collect();
    let mut added = 0usize;
    for row in scraped {
        if !existing_keys.contains(&event_key(&row)) {
            ledger.rows.push(row);
            added += 1;
        }
    }

    if added > 0 {
        store
            .save(&odds_path, &ledger)
            .with_context(|| format!("saving odds ledger for {league}"))?;
        info!(league = %league, total = ledger.rows.len(), added, "odds ledger updated");
    } else {
        info!(league = %league, total = ledger.rows.len(), "no new events, odds ledger is current");
    }

    Ok(CollectReport {
        total: ledger.rows.len(),
        added,
    })
}
