//! REST control panel for the hockey odds pipeline.
//!
//! Read endpoints serve the schedule (unsettled) and results (settled)
//! views straight from the CSV ledgers; the trigger endpoint starts one of
//! the four named runs as a detached task and acknowledges immediately —
//! completion is observed only through the ledger files.

pub mod handlers;
pub mod server;

pub use server::{ApiServer, AppState};
