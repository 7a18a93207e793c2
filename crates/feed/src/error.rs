//! Error types for the feed boundary.

use thiserror::Error;

/// Errors that can occur while obtaining pages from the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The scraping session could not be established at all. Fatal: the
    /// whole run aborts.
    #[error("session setup failed: {0}")]
    Session(String),

    /// A single page navigation failed. The run skips what depended on it.
    #[error("navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    /// A saved page fixture was missing or malformed.
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl FeedError {
    /// Creates a navigation error.
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// True when the error means the whole run must abort.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}
