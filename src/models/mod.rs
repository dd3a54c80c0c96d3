use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Token profile (feed) ──────────────────────────────────────────────────────

/// One chain-filtered entry of the token-profile feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenProfile {
    pub address: String,
    pub chain: String,
    pub dex_url: Option<String>,
    pub icon: Option<String>,
    pub header: Option<String>,
    pub open_graph: Option<String>,
    pub description: Option<String>,
    pub links: Vec<TokenLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TokenLink {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
    pub url: Option<String>,
}

// ── Scan record ───────────────────────────────────────────────────────────────

/// Everything scraped for one token. Only ever built from a complete scrape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    pub address: String,
    pub name: String,
    pub score: f64,
    pub price: String,
    pub stats: TokenStats,
    pub risk_check_url: String,
    pub analytics_url: String,
    pub scraped_at: NaiveDateTime,
}

/// The four stat blocks, in page order. `liquidity` is `None` when the page
/// renders no liquidity block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenStats {
    pub market_cap: String,
    pub liquidity: Option<String>,
    pub volume_24h: String,
    pub holders: String,
}

impl TokenStats {
    pub const MISSING: &'static str = "None";

    pub fn liquidity_display(&self) -> &str {
        self.liquidity.as_deref().unwrap_or(Self::MISSING)
    }
}

// ── Raw feed rows ─────────────────────────────────────────────────────────────

/// Feed element as served: every field optional, camelCase on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenProfile {
    pub url: Option<String>,
    pub chain_id: Option<String>,
    pub token_address: Option<String>,
    pub icon: Option<String>,
    pub header: Option<String>,
    pub open_graph: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<TokenLink>>,
}

// ── Raw page extraction ───────────────────────────────────────────────────────

/// Untouched element texts pulled from a token page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTokenPage {
    pub name: String,
    pub score: String,
    pub price: String,
    pub stats: Vec<String>,
}
