//! Raw feed boundary for the hockey odds pipeline.
//!
//! The browser automation layer lives outside this workspace; what crosses
//! the boundary is a parsed page tree ([`page::PageNode`]). This crate
//! provides:
//! - The page tree model and class-substring selector queries
//! - Prioritized extraction strategies for odds rows and match results
//! - The async [`provider::PageProvider`] seam plus a JSON fixture provider

pub mod error;
pub mod extract;
pub mod page;
pub mod provider;

pub use error::FeedError;
pub use extract::{extract_all_odds, extract_all_results, extract_odds, extract_result};
pub use page::{PageNode, Query, Selector};
pub use provider::{
    dump_debug_page, soft_wait_ready, FixtureProvider, FixtureProviderFactory, PageProvider,
    ProviderFactory, SessionOptions,
};
