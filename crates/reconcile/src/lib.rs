//! Pipeline runs over the CSV ledger.
//!
//! Two run shapes per league: an odds-collection run (scrape the upcoming
//! fixtures page and merge new rows into the odds ledger) and a
//! reconciliation run (match pending rows against scraped results and label
//! outcomes). Both are idempotent over their inputs.

pub mod collect;
pub mod reconciler;
pub mod runs;
pub mod settlement;

pub use collect::{collect_odds, CollectReport};
pub use reconciler::{ReconcileReport, Reconciler};
pub use runs::{execute, RunKind, RunOutcome};
pub use settlement::{apply_score, assess, Eligibility, SettlementWindow};
