use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub sites: SiteConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Token-profile feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,

    #[serde(default = "default_chain")]
    pub chain: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// WebDriver session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub extra_args: Vec<String>,

    #[serde(default)]
    pub selectors: Selectors,
}

/// CSS selectors for the token page. Opaque lookup keys; the page layout
/// changes without notice, so they live in config rather than code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Selectors {
    #[serde(default = "default_name_selector")]
    pub name: String,

    #[serde(default = "default_score_selector")]
    pub score: String,

    #[serde(default = "default_price_selector")]
    pub price: String,

    #[serde(default = "default_stats_selector")]
    pub stats: String,
}

/// External sites that token addresses are templated into
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default = "default_scrape_base")]
    pub scrape_base: String,

    #[serde(default = "default_risk_base")]
    pub risk_base: String,

    #[serde(default = "default_analytics_base")]
    pub analytics_base: String,
}

/// Scan orchestration configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Table output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default = "default_true")]
    pub hyperlinks: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_feed_url() -> String {
    "https://api.dexscreener.com/token-profiles/latest/v1".to_string()
}
fn default_chain() -> String {
    "solana".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_jitter_ms() -> u64 {
    250
}
fn default_user_agent() -> String {
    concat!("organic-scan/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_wait_timeout_secs() -> u64 {
    5
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_name_selector() -> String {
    r".flex.items-center.gap-1\.5.text-xl.font-semibold".to_string()
}
fn default_score_selector() -> String {
    ".flex.items-center.rounded-r.px-2.text-sm.font-medium.text-black".to_string()
}
fn default_price_selector() -> String {
    ".flex.items-baseline.gap-1.text-2xl.font-semibold".to_string()
}
fn default_stats_selector() -> String {
    ".grid.grid-cols-4 .text-sm.font-semibold".to_string()
}
fn default_scrape_base() -> String {
    "https://jup.ag".to_string()
}
fn default_risk_base() -> String {
    "https://rugcheck.xyz".to_string()
}
fn default_analytics_base() -> String {
    "https://gmgn.ai".to_string()
}
fn default_true() -> bool {
    true
}
fn default_concurrency() -> usize {
    1
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            chain: default_chain(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            jitter_ms: default_jitter_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            wait_timeout_secs: default_wait_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            extra_args: Vec::new(),
            selectors: Selectors::default(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            name: default_name_selector(),
            score: default_score_selector(),
            price: default_price_selector(),
            stats: default_stats_selector(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scrape_base: default_scrape_base(),
            risk_base: default_risk_base(),
            analytics_base: default_analytics_base(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: true,
            hyperlinks: true,
        }
    }
}

// ── Derived values ───────────────────────────────────────────────────────────

impl BrowserConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Selectors {
    /// Every selector the page scraper reads, in wait order.
    pub fn extracted(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.score.as_str(),
            self.price.as_str(),
            self.stats.as_str(),
        ]
    }
}

impl SiteConfig {
    /// Page the browser scrapes for `address`. The address is not validated.
    pub fn token_page_url(&self, address: &str) -> String {
        format!("{}/tokens/{}", self.scrape_base.trim_end_matches('/'), address)
    }

    pub fn risk_check_url(&self, address: &str) -> String {
        format!("{}/tokens/{}", self.risk_base.trim_end_matches('/'), address)
    }

    pub fn analytics_url(&self, address: &str) -> String {
        format!("{}/sol/token/{}", self.analytics_base.trim_end_matches('/'), address)
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

/// `ORGANIC__SECTION__KEY` overrides, e.g. `ORGANIC__SCAN__CONCURRENCY=4`.
/// `browser.extra_args` is read as a comma-separated list.
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix("ORGANIC")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("browser.extra_args")
}

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(env_overrides())
            .build()
            .context("Failed to read configuration sources")?;

        let app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed.chain.trim().is_empty() {
            bail!("feed.chain must not be empty");
        }
        if self.scan.concurrency == 0 {
            bail!("scan.concurrency must be at least 1");
        }
        if self.browser.wait_timeout_secs == 0 {
            bail!("browser.wait_timeout_secs must be at least 1");
        }

        for (key, value) in [
            ("feed.url", &self.feed.url),
            ("browser.webdriver_url", &self.browser.webdriver_url),
            ("sites.scrape_base", &self.sites.scrape_base),
            ("sites.risk_base", &self.sites.risk_base),
            ("sites.analytics_base", &self.sites.analytics_base),
        ] {
            Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", key, value))?;
        }

        Ok(())
    }
}
