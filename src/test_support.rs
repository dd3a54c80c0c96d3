//! In-memory doubles for the feed and browser seams.

use crate::config::{BrowserConfig, Selectors};
use crate::error::{BrowserError, FetchError};
use crate::models::{RawTokenProfile, TokenLink};
use crate::scraper::browser::{BrowserSession, SessionFactory};
use crate::scraper::feed::{CandidateSet, filter_profiles};
use crate::scraper::TokenFeed;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn browser_config() -> BrowserConfig {
    BrowserConfig {
        wait_timeout_secs: 1,
        poll_interval_ms: 10,
        selectors: Selectors {
            name: ".token-name".into(),
            score: ".organic-score".into(),
            price: ".token-price".into(),
            stats: ".stats .stat-value".into(),
        },
        ..BrowserConfig::default()
    }
}

/// A token page in the shape `browser_config()` selectors expect.
pub fn token_page_html(name: &str, score: &str, price: &str, stats: &[&str]) -> String {
    let stats: String = stats
        .iter()
        .map(|s| format!("<div><span class=\"stat-value\">{}</span></div>", s))
        .collect();
    format!(
        "<html><body>\
         <h1 class=\"token-name\">{}</h1>\
         <div class=\"organic-score\">{}</div>\
         <div class=\"token-price\">{}</div>\
         <div class=\"stats\">{}</div>\
         </body></html>",
        name, score, price, stats
    )
}

pub fn good_page(name: &str, score: &str) -> FakePage {
    FakePage::Html(token_page_html(name, score, "$1.00", &["$1M", "$100K", "$50K", "1,024"]))
}

#[derive(Debug, Clone)]
pub enum FakePage {
    Html(String),
    NeverRenders,
    /// Navigating here kills the session, like a driver restart mid-run.
    Crashes,
}

/// Serves canned pages keyed by the token address at the end of the URL.
/// Unknown addresses behave like a page that never renders. Once a `Crashes`
/// page is hit every later command fails.
#[derive(Debug, Default)]
pub struct FakeSession {
    pages: HashMap<String, FakePage>,
    current: Option<String>,
    pub visited: Vec<String>,
    pub closed: bool,
    pub lost: bool,
}

impl FakeSession {
    pub fn with_pages<I, K>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, FakePage)>,
        K: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    fn current_page(&self) -> Option<&FakePage> {
        self.current.as_ref().and_then(|a| self.pages.get(a))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.lost {
            return Err(BrowserError::Command("invalid session id".into()));
        }
        self.visited.push(url.to_string());
        self.current = url.rsplit_once("/tokens/").map(|(_, a)| a.to_string());
        if matches!(self.current_page(), Some(FakePage::Crashes)) {
            self.lost = true;
            return Err(BrowserError::Navigate {
                url: url.to_string(),
                detail: "chrome not reachable".into(),
            });
        }
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        match self.current_page() {
            Some(FakePage::Html(_)) => Ok(()),
            _ => Err(BrowserError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            }),
        }
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        match self.current_page() {
            Some(FakePage::Html(html)) => Ok(html.clone()),
            _ => Ok("<html></html>".to_string()),
        }
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        !self.lost
    }
}

/// Hands out `FakeSession`s sharing one page table. `max_sessions` caps how
/// many opens succeed.
#[derive(Debug, Clone, Default)]
pub struct FakeFactory {
    pages: HashMap<String, FakePage>,
    opened: Arc<AtomicUsize>,
    max_sessions: Option<usize>,
}

impl FakeFactory {
    pub fn with_pages<I, K>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, FakePage)>,
        K: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = Some(max);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, BrowserError> {
        let n = self.opened.load(Ordering::SeqCst);
        if self.max_sessions.is_some_and(|max| n >= max) {
            return Err(BrowserError::Connect {
                url: "fake://webdriver".into(),
                detail: "no more sessions".into(),
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession::with_pages(self.pages.clone()))
    }
}

/// Feed double: either a fixed list of raw profiles or a failure.
#[derive(Debug, Default)]
pub struct FakeFeed {
    pub entries: Vec<(String, String)>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeFeed {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(chain, addr)| (chain.to_string(), addr.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TokenFeed for FakeFeed {
    async fn fetch_candidates(&self, chain: &str) -> Result<CandidateSet, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Status {
                url: "fake://feed".into(),
                status: 503,
            });
        }
        let raw = self
            .entries
            .iter()
            .map(|(c, a)| RawTokenProfile {
                chain_id: Some(c.clone()),
                token_address: Some(a.clone()),
                links: Some(vec![TokenLink::default()]),
                ..RawTokenProfile::default()
            })
            .collect();
        Ok(filter_profiles(raw, chain))
    }
}
