use crate::config::{BrowserConfig, Selectors, SiteConfig};
use crate::error::{ScrapeCause, ScrapeError};
use crate::models::ScanRecord;
use chrono::Utc;
use std::time::Duration;
use tracing::debug;

use super::browser::BrowserSession;
use super::cleaner::{clean_price, parse_score, remap_stats};
use super::parsers::parse_token_page;

/// Scrapes one token page through a caller-owned browser session.
#[derive(Debug, Clone)]
pub struct PageScraper {
    sites: SiteConfig,
    selectors: Selectors,
    wait_timeout: Duration,
}

impl PageScraper {
    pub fn new(sites: &SiteConfig, browser: &BrowserConfig) -> Self {
        Self {
            sites: sites.clone(),
            selectors: browser.selectors.clone(),
            wait_timeout: browser.wait_timeout(),
        }
    }

    /// Navigate to the token page, wait for it to render, extract a record.
    /// `address` goes into the URL verbatim.
    pub async fn scrape_token<S>(&self, session: &mut S, address: &str) -> Result<ScanRecord, ScrapeError>
    where
        S: BrowserSession + ?Sized,
    {
        let fail = |cause: ScrapeCause| ScrapeError::new(address, cause);
        let url = self.sites.token_page_url(address);

        session.goto(&url).await.map_err(|e| fail(e.into()))?;
        for selector in self.selectors.extracted() {
            session
                .wait_visible(selector, self.wait_timeout)
                .await
                .map_err(|e| fail(e.into()))?;
        }

        let html = session.page_source().await.map_err(|e| fail(e.into()))?;
        let raw = parse_token_page(&html, &self.selectors).map_err(fail)?;
        debug!("{}: raw page fields {:?}", address, raw);

        let score = parse_score(&raw.score).map_err(fail)?;
        let stats = remap_stats(&raw.stats).map_err(fail)?;

        Ok(ScanRecord {
            address: address.to_string(),
            name: raw.name,
            score,
            price: clean_price(&raw.price),
            stats,
            risk_check_url: self.sites.risk_check_url(address),
            analytics_url: self.sites.analytics_url(address),
            scraped_at: Utc::now().naive_utc(),
        })
    }
}
