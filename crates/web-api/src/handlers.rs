use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use puckline_core::League;
use puckline_feed::SessionOptions;
use puckline_ledger::{view, MatchView, StoreError};
use puckline_reconcile::{execute, RunKind};

use crate::server::AppState;

#[derive(Serialize)]
pub struct LeagueViewResponse {
    pub league: String,
    pub total_matches: usize,
    pub matches: Vec<MatchView>,
}

#[derive(Serialize)]
pub struct FileStatus {
    pub exists: bool,
    pub size: u64,
    /// Last modification time, `dd.mm.yyyy HH:MM`, or `-` when missing.
    pub modified: String,
    /// Data rows in the file, header excluded.
    pub records: usize,
}

#[derive(Deserialize)]
pub struct RunRequest {
    pub parser_type: String,
    #[serde(default)]
    pub headless: Option<bool>,
}

#[derive(Serialize)]
pub struct RunResponse {
    pub status: String,
    pub message: String,
}

fn parse_league(raw: &str) -> Result<League, StatusCode> {
    raw.parse().map_err(|_| StatusCode::NOT_FOUND)
}

fn load_rows(
    state: &AppState,
    file_name: &str,
) -> Result<Vec<puckline_ledger::OddsRecord>, StatusCode> {
    let path = state.config.data_path(file_name);
    match state.store.load(&path) {
        Ok(file) => Ok(file.rows),
        // No ledger yet just means nothing has been collected.
        Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
        Err(e) => {
            error!(path = %path.display(), error = %e, "could not read ledger");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Upcoming (unsettled) fixtures for a league, newest first.
///
/// # Errors
/// `404` for an unknown league, `500` when the ledger cannot be read.
pub async fn list_schedule(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> Result<Json<LeagueViewResponse>, StatusCode> {
    let league = parse_league(&league)?;
    let rows = load_rows(&state, &league.odds_file())?;
    let matches = view::unsettled(&rows);
    Ok(Json(LeagueViewResponse {
        league: league.display_name().to_string(),
        total_matches: matches.len(),
        matches,
    }))
}

/// Settled results for a league, newest first.
///
/// # Errors
/// `404` for an unknown league, `500` when the ledger cannot be read.
pub async fn list_results(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> Result<Json<LeagueViewResponse>, StatusCode> {
    let league = parse_league(&league)?;
    let rows = load_rows(&state, &league.results_file())?;
    let matches = view::settled(&rows);
    Ok(Json(LeagueViewResponse {
        league: league.display_name().to_string(),
        total_matches: matches.len(),
        matches,
    }))
}

/// Per-ledger file status for the control panel.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<HashMap<String, FileStatus>> {
    let mut files = HashMap::new();
    for kind in RunKind::ALL {
        let file_name = if kind.is_results() {
            kind.league().results_file()
        } else {
            kind.league().odds_file()
        };
        let path = state.config.data_path(&file_name);
        files.insert(kind.id().to_string(), file_status(&state, &path));
    }
    Json(files)
}

fn file_status(state: &AppState, path: &FsPath) -> FileStatus {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .map(|ts| {
                    DateTime::<Local>::from(ts)
                        .format("%d.%m.%Y %H:%M")
                        .to_string()
                })
                .unwrap_or_else(|_| "-".to_string());
            FileStatus {
                exists: true,
                size: meta.len(),
                modified,
                records: state.store.count_records(path),
            }
        }
        Err(_) => FileStatus {
            exists: false,
            size: 0,
            modified: "-".to_string(),
            records: 0,
        },
    }
}

/// Starts a named run in the background and acknowledges immediately.
///
/// The response never reports completion; the run's effects show up in the
/// ledger files. A second trigger against the same ledger fails inside the
/// detached task on the ledger lock and is only logged.
pub async fn trigger_run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RunRequest>,
) -> (StatusCode, Json<RunResponse>) {
    let Some(kind) = RunKind::parse(&req.parser_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(RunResponse {
                status: "error".to_string(),
                message: format!("unknown parser type: {}", req.parser_type),
            }),
        );
    };

    let options = SessionOptions {
        headless: req.headless.unwrap_or(state.config.scrape.headless),
    };
    let factory = state.factory.clone();
    let config = state.config.clone();

    tokio::spawn(async move {
        match execute(kind, factory.as_ref(), &config, options).await {
            Ok(_) => info!(run = %kind, "background run finished"),
            Err(e) => error!(run = %kind, error = %e, "background run failed"),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(RunResponse {
            status: "success".to_string(),
            message: format!("run {kind} started in the background"),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use puckline_core::AppConfig;
    use puckline_feed::FixtureProviderFactory;
    use puckline_ledger::CsvStore;

    fn state_with_data_dir(data_dir: &FsPath) -> AppState {
        let mut config = AppConfig::default();
        config.storage.data_dir = data_dir.to_path_buf();
        AppState {
            config,
            factory: Arc::new(FixtureProviderFactory::new("fixtures")),
            store: CsvStore::new(),
        }
    }

    #[test]
    fn test_parse_league() {
        assert!(parse_league("khl").is_ok());
        assert!(parse_league("nhl").is_ok());
        assert_eq!(parse_league("shl"), Err(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_file_status_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data_dir(dir.path());

        let status = file_status(&state, &dir.path().join("khl_odds.csv"));
        assert!(!status.exists);
        assert_eq!(status.records, 0);
        assert_eq!(status.modified, "-");
    }

    #[test]
    fn test_file_status_counts_records() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data_dir(dir.path());
        let path = dir.path().join("khl_odds.csv");
        std::fs::write(&path, "event_name,event_time\nА — Б,09.10.2024 19:30\n").unwrap();

        let status = file_status(&state, &path);
        assert!(status.exists);
        assert_eq!(status.records, 1);
        assert_ne!(status.modified, "-");
    }

    #[tokio::test]
    async fn test_load_rows_missing_ledger_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_data_dir(dir.path());
        let rows = load_rows(&state, "khl_odds.csv").unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_trigger_run_acknowledges_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(state_with_data_dir(dir.path()));

        let (code, Json(body)) = trigger_run(
            State(state),
            Json(RunRequest {
                parser_type: "khl_odds".to_string(),
                headless: Some(true),
            }),
        )
        .await;

        // The ack comes back regardless of how the detached run fares.
        assert_eq!(code, StatusCode::ACCEPTED);
        assert_eq!(body.status, "success");
        assert!(body.message.contains("khl_odds"));
    }

    #[tokio::test]
    async fn test_trigger_run_rejects_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(state_with_data_dir(dir.path()));

        let (code, Json(body)) = trigger_run(
            State(state),
            Json(RunRequest {
                parser_type: "shl_odds".to_string(),
                headless: None,
            }),
        )
        .await;

        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");
    }
}
