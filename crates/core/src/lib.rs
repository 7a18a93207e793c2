//! Core types and pure functions for the hockey odds pipeline.
//!
//! This crate provides:
//! - League definitions and per-league file naming
//! - Application configuration loaded via figment
//! - Team/event identity normalization and fuzzy matching
//! - Resolution of site-relative time phrases into ledger timestamps

pub mod config;
pub mod config_loader;
pub mod identity;
pub mod league;
pub mod timeparse;

pub use config::{
    AppConfig, LeagueEndpoints, LeaguesConfig, ReconcileConfig, ScrapeConfig, ServerConfig,
    StorageConfig,
};
pub use config_loader::ConfigLoader;
pub use identity::{find_best_match, normalize, similarity, MATCH_THRESHOLD};
pub use league::{League, ScoreAdjust};
pub use timeparse::{
    format_event_time, format_parse_timestamp, parse_event_time, resolve_event_time,
};
