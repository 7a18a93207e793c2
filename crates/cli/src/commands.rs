//! Command implementations for the puckline binary.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use puckline_core::{AppConfig, ConfigLoader, League};
use puckline_feed::{FixtureProviderFactory, SessionOptions};
use puckline_ledger::{view, CsvStore, MatchView, StoreError};
use puckline_reconcile::{execute, RunKind, RunOutcome};
use puckline_web_api::ApiServer;

fn load_config(path: &str) -> Result<AppConfig> {
    ConfigLoader::load_from(path).with_context(|| format!("loading config from {path}"))
}

fn factory(config: &AppConfig) -> FixtureProviderFactory {
    // Page trees come from the replay directory; the live browser driver is
    // an external collaborator that writes the same JSON shape.
    FixtureProviderFactory::new(config.scrape.fixture_dir.clone())
}

fn run_kind(league: League, results: bool) -> RunKind {
    match (league, results) {
        (League::Khl, false) => RunKind::KhlOdds,
        (League::Khl, true) => RunKind::KhlResults,
        (League::Nhl, false) => RunKind::NhlOdds,
        (League::Nhl, true) => RunKind::NhlResults,
    }
}

pub async fn run_collect(league: &str, config_path: &str, headless: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let league: League = league.parse()?;
    let provider_factory = factory(&config);

    let outcome = execute(
        run_kind(league, false),
        &provider_factory,
        &config,
        SessionOptions { headless },
    )
    .await?;

    if let RunOutcome::Collected(report) = outcome {
        if report.added > 0 {
            println!(
                "Added {} new events, {} total in the {} odds ledger",
                report.added,
                report.total,
                league.id()
            );
        } else {
            println!(
                "No new events, {} odds ledger is current ({} rows)",
                league.id(),
                report.total
            );
        }
    }
    Ok(())
}

pub async fn run_reconcile(league: &str, config_path: &str, headless: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let league: League = league.parse()?;
    let provider_factory = factory(&config);

    let outcome = execute(
        run_kind(league, true),
        &provider_factory,
        &config,
        SessionOptions { headless },
    )
    .await?;

    if let RunOutcome::Reconciled(report) = outcome {
        println!(
            "Settled {} events ({} already settled, {} unresolved) in the {} results ledger",
            report.settled,
            report.skipped_settled,
            report.unresolved,
            league.id()
        );
    }
    Ok(())
}

pub async fn run_serve(addr: &str, config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let provider_factory = Arc::new(factory(&config));
    ApiServer::new(config, provider_factory).serve(addr).await
}

pub fn run_show(league: &str, view_name: &str, config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let league: League = league.parse()?;
    let store = CsvStore::new();

    let (file_name, want_settled) = match view_name {
        "schedule" => (league.odds_file(), false),
        "results" => (league.results_file(), true),
        other => bail!("unknown view: {other} (expected schedule or results)"),
    };

    let rows = match store.load(&config.data_path(&file_name)) {
        Ok(file) => file.rows,
        Err(StoreError::NotFound { .. }) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let matches = if want_settled {
        view::settled(&rows)
    } else {
        view::unsettled(&rows)
    };

    println!(
        "{} {}: {} matches",
        league.display_name(),
        view_name,
        matches.len()
    );
    for m in &matches {
        print_match(m, want_settled);
    }
    Ok(())
}

fn print_match(m: &MatchView, settled: bool) {
    if settled {
        println!("{}  {}  {}", m.formatted_time, m.event_name, m.match_result);
    } else {
        println!(
            "{}  {}  1: {} | X: {} | 2: {}",
            m.formatted_time, m.event_name, m.odds_1, m.odds_x, m.odds_2
        );
    }
    if !m.total_value.is_empty() {
        println!(
            "       total {}: over {} | under {}",
            m.total_value, m.total_over, m.total_under
        );
    }
}
