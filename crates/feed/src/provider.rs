//! The page provider seam.
//!
//! A [`PageProvider`] yields parsed page trees for a league's odds page and
//! for its results page on a given date. Real implementations wrap a driven
//! browser and live outside this workspace; the [`FixtureProvider`] replays
//! page trees saved as JSON and backs tests and offline runs.
//!
//! Providers are opened per run through a [`ProviderFactory`] and released
//! when dropped, so the session goes away on every exit path.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use puckline_core::League;

use crate::error::FeedError;
use crate::page::PageNode;

/// Options for opening a scraping session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Run the browser without a visible window.
    pub headless: bool,
}

/// Source of parsed pages for one scraping session.
#[async_trait]
pub trait PageProvider: Send + Sync {
    /// The upcoming-fixtures page with current odds for a league.
    async fn odds_page(&self, league: League) -> Result<PageNode, FeedError>;

    /// The results page for a league and date (`?date=YYYY-MM-DD`).
    async fn results_page(&self, league: League, date: NaiveDate) -> Result<PageNode, FeedError>;
}

/// Opens page providers; one provider per run.
pub trait ProviderFactory: Send + Sync {
    /// Opens a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Session`] when no session can be established;
    /// the caller aborts the run.
    fn open(&self, options: SessionOptions) -> Result<Box<dyn PageProvider>, FeedError>;
}

/// Waits for a page-ready signal, but only up to `timeout`.
///
/// This is a soft bound: on expiry a warning is logged and the caller
/// proceeds with whatever the page currently holds.
pub async fn soft_wait_ready<F>(ready: F, timeout: Duration)
where
    F: Future<Output = ()>,
{
    if tokio::time::timeout(timeout, ready).await.is_err() {
        warn!(
            timeout_secs = timeout.as_secs(),
            "page did not signal ready in time, continuing anyway"
        );
    }
}

/// Persists a page tree for offline inspection after a total extraction
/// failure.
pub fn dump_debug_page(path: &Path, page: &PageNode) {
    match serde_json::to_string_pretty(page).map(|json| std::fs::write(path, json)) {
        Ok(Ok(())) => info!(path = %path.display(), "saved page for debugging"),
        Ok(Err(e)) => warn!(path = %path.display(), error = %e, "could not save debug page"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not serialize debug page"),
    }
}

/// Replays page trees saved as JSON files.
///
/// Expected layout under the fixture root:
/// - `{league}_odds.json` — the odds page
/// - `{league}_results_{YYYY-MM-DD}.json` — a results page per date
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    root: PathBuf,
}

impl FixtureProvider {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load(&self, file_name: &str) -> Result<PageNode, FeedError> {
        let path = self.root.join(file_name);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            FeedError::navigation(path.display().to_string(), e.to_string())
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| FeedError::Fixture(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl PageProvider for FixtureProvider {
    async fn odds_page(&self, league: League) -> Result<PageNode, FeedError> {
        self.load(&format!("{}_odds.json", league.id()))
    }

    async fn results_page(&self, league: League, date: NaiveDate) -> Result<PageNode, FeedError> {
        self.load(&format!(
            "{}_results_{}.json",
            league.id(),
            date.format("%Y-%m-%d")
        ))
    }
}

/// Factory handing out [`FixtureProvider`] sessions.
#[derive(Debug, Clone)]
pub struct FixtureProviderFactory {
    root: PathBuf,
}

impl FixtureProviderFactory {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProviderFactory for FixtureProviderFactory {
    fn open(&self, options: SessionOptions) -> Result<Box<dyn PageProvider>, FeedError> {
        if !self.root.is_dir() {
            return Err(FeedError::Session(format!(
                "fixture directory missing: {}",
                self.root.display()
            )));
        }
        info!(
            root = %self.root.display(),
            headless = options.headless,
            "opened fixture page session"
        );
        Ok(Box::new(FixtureProvider::new(self.root.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageNode;

    #[tokio::test]
    async fn test_fixture_provider_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageNode::new("div").with_text("расписание");
        std::fs::write(
            dir.path().join("khl_odds.json"),
            serde_json::to_string(&page).unwrap(),
        )
        .unwrap();

        let provider = FixtureProvider::new(dir.path());
        let loaded = provider.odds_page(League::Khl).await.unwrap();
        assert_eq!(loaded, page);
    }

    #[tokio::test]
    async fn test_fixture_provider_missing_page_is_navigation_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FixtureProvider::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 10, 9).unwrap();
        let err = provider.results_page(League::Khl, date).await.unwrap_err();
        assert!(matches!(err, FeedError::Navigation { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_factory_rejects_missing_root() {
        let factory = FixtureProviderFactory::new("definitely/not/here");
        let err = factory.open(SessionOptions::default()).err().unwrap();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_soft_wait_ready_expires_quietly() {
        // A ready signal that never fires; the wait must still return.
        soft_wait_ready(std::future::pending(), Duration::from_millis(10)).await;
    }

    #[test]
    fn test_dump_debug_page_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug_khl_page.json");
        let page = PageNode::new("html").with_text("пусто");

        dump_debug_page(&path, &page);

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: PageNode = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, page);
    }
}
