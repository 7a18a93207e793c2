//! Record models for the odds ledger.

pub mod odds;
pub mod score;

pub use odds::{OddsRecord, Outcome, ALL_FIELDS, ODDS_FIELDS};
pub use score::{Finish, ScoreLine};
