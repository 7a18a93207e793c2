//! The four named runs and their dispatch.
//!
//! The control panel and the CLI both start runs by name: odds collection
//! or result reconciliation, per league. A provider session is opened per
//! run and dropped on every exit path.

use std::fmt;

use anyhow::{Context, Result};
use tracing::info;

use puckline_core::{AppConfig, League};
use puckline_feed::{ProviderFactory, SessionOptions};
use puckline_ledger::CsvStore;

use crate::collect::{collect_odds, CollectReport};
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::settlement::SettlementWindow;

/// A named run the pipeline can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    KhlOdds,
    KhlResults,
    NhlOdds,
    NhlResults,
}

impl RunKind {
    pub const ALL: [RunKind; 4] = [
        RunKind::KhlOdds,
        RunKind::KhlResults,
        RunKind::NhlOdds,
        RunKind::NhlResults,
    ];

    /// Parses the wire name used by the trigger endpoint.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "khl_odds" => Some(Self::KhlOdds),
            "khl_results" => Some(Self::KhlResults),
            "nhl_odds" => Some(Self::NhlOdds),
            "nhl_results" => Some(Self::NhlResults),
            _ => None,
        }
    }

    /// Wire name of this run.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::KhlOdds => "khl_odds",
            Self::KhlResults => "khl_results",
            Self::NhlOdds => "nhl_odds",
            Self::NhlResults => "nhl_results",
        }
    }

    #[must_use]
    pub fn league(self) -> League {
        match self {
            Self::KhlOdds | Self::KhlResults => League::Khl,
            Self::NhlOdds | Self::NhlResults => League::Nhl,
        }
    }

    /// True for reconciliation runs, false for odds collection.
    #[must_use]
    pub fn is_results(self) -> bool {
        matches!(self, Self::KhlResults | Self::NhlResults)
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of an executed run.
#[derive(Debug, Clone, Copy)]
pub enum RunOutcome {
    Collected(CollectReport),
    Reconciled(ReconcileReport),
}

/// Executes one named run with a fresh provider session.
///
/// # Errors
///
/// Fails on session setup, a missing odds ledger (reconciliation only), a
/// held ledger lock, or write failure after retries.
pub async fn execute(
    kind: RunKind,
    factory: &dyn ProviderFactory,
    config: &AppConfig,
    options: SessionOptions,
) -> Result<RunOutcome> {
    info!(run = %kind, headless = options.headless, "starting run");

    // Session lives for this run only; dropped on every path out.
    let provider = factory.open(options).context("opening page session")?;
    let store = CsvStore::new();
    let data_dir = config.storage.data_dir.clone();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    let now = chrono::Local::now().naive_local();

    let outcome = if kind.is_results() {
        let report = Reconciler::new(provider.as_ref(), store)
            .with_window(SettlementWindow::from_config(&config.reconcile))
            .with_default_total_line(config.reconcile.default_total_line)
            .run(kind.league(), &data_dir, now)
            .await?;
        RunOutcome::Reconciled(report)
    } else {
        let report = collect_odds(provider.as_ref(), &store, kind.league(), &data_dir, now).await?;
        RunOutcome::Collected(report)
    };

    info!(run = %kind, "run finished");
    Ok(outcome)
}
