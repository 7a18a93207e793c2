//! CSV-backed odds ledger for the hockey odds pipeline.
//!
//! This crate provides:
//! - Record models for odds rows and match results
//! - The CSV store with lock-file guard and bounded write retry
//! - Merge/dedupe operations that never clobber settled rows
//! - Read-only settled/unsettled views for presentation

pub mod merge;
pub mod models;
pub mod store;
pub mod view;

pub use merge::{dedupe, event_key, merge_preserving_results, snapshot_key};
pub use models::{Finish, OddsRecord, Outcome, ScoreLine, ALL_FIELDS, ODDS_FIELDS};
pub use store::{CsvStore, LedgerFile, LedgerLock, StoreError};
pub use view::{settled, unsettled, MatchView};
