pub mod browser;
pub mod cleaner;
pub mod feed;
pub mod http_client;
pub mod page;
pub mod parsers;

use crate::error::FetchError;
use async_trait::async_trait;

pub use self::browser::{BrowserSession, SessionFactory, WebDriverConnector};
pub use self::feed::{CandidateSet, DexScreenerFeed};
pub use self::page::PageScraper;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable candidate source.
#[async_trait]
pub trait TokenFeed: Send + Sync {
    /// All feed entries tagged with `chain`, keyed by token address.
    async fn fetch_candidates(&self, chain: &str) -> Result<CandidateSet, FetchError>;
}
