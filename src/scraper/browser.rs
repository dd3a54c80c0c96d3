//! Narrow browser capability: navigate, wait for visibility, read the DOM.
//!
//! The production implementation drives chromedriver (or any W3C WebDriver
//! endpoint) through `fantoccini`. Everything above this module only sees the
//! `BrowserSession` trait, so scans can be exercised without a browser.

use crate::config::BrowserConfig;
use crate::error::BrowserError;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// One browser tab. Exactly one navigation may be in flight against it.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Block until an element matching `selector` is displayed.
    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Rendered DOM of the current page.
    async fn page_source(&mut self) -> Result<String, BrowserError>;

    async fn close(&mut self) -> Result<(), BrowserError>;

    /// False once the underlying driver session has stopped answering.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Opens new sessions on demand.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: BrowserSession;

    async fn open(&self) -> Result<Self::Session, BrowserError>;
}

// ── WebDriver ─────────────────────────────────────────────────────────────────

pub struct WebDriverConnector {
    config: BrowserConfig,
}

impl WebDriverConnector {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--log-level=3".to_string(),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());

        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "excludeSwitches": ["enable-logging", "enable-automation"],
            }),
        );
        caps
    }
}

#[async_trait]
impl SessionFactory for WebDriverConnector {
    type Session = WebDriverSession;

    async fn open(&self) -> Result<WebDriverSession, BrowserError> {
        let url = &self.config.webdriver_url;
        info!("Opening browser session via {}", url);

        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        let client = builder
            .connect(url)
            .await
            .map_err(|e| BrowserError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        // Some token pages refuse to render for automation-flagged browsers.
        if let Err(e) = client
            .execute(
                "Object.defineProperty(navigator, 'webdriver', { get: () => false });",
                vec![],
            )
            .await
        {
            debug!("Could not mask navigator.webdriver: {}", e);
        }

        Ok(WebDriverSession {
            client,
            poll_interval: self.config.poll_interval(),
            lost: false,
        })
    }
}

pub struct WebDriverSession {
    client: Client,
    poll_interval: Duration,
    lost: bool,
}

impl WebDriverSession {
    /// A failed WebDriver command means the driver or the browser went away.
    fn command_failed(&mut self, e: CmdError) -> BrowserError {
        if !self.lost {
            warn!("WebDriver session lost: {}", e);
            self.lost = true;
        }
        BrowserError::Command(e.to_string())
    }

    async fn first_displayed(&mut self, selector: &str) -> Result<bool, BrowserError> {
        let found = self.client.find_all(Locator::Css(selector)).await;
        let elements = match found {
            Ok(elements) => elements,
            Err(e) => return Err(self.command_failed(e)),
        };

        for element in elements {
            // Elements can detach between find and query while the page hydrates.
            if element.is_displayed().await.unwrap_or(false) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        debug!("Navigating to {}", url);
        let navigated = self.client.goto(url).await;
        if let Err(e) = navigated {
            let detail = self.command_failed(e).to_string();
            return Err(BrowserError::Navigate {
                url: url.to_string(),
                detail,
            });
        }
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.first_displayed(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        let source = self.client.source().await;
        match source {
            Ok(html) => Ok(html),
            Err(e) => Err(self.command_failed(e)),
        }
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        info!("Closing browser session");
        self.client.clone().close().await.map_err(|e| {
            warn!("Browser session did not close cleanly: {}", e);
            BrowserError::Command(e.to_string())
        })
    }

    fn is_alive(&self) -> bool {
        !self.lost
    }
}
