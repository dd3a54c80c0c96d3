//! Token-profile feed: one GET, then a chain filter keyed by token address.

use crate::config::FeedConfig;
use crate::error::FetchError;
use crate::models::{RawTokenProfile, TokenProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use super::TokenFeed;
use super::http_client::HttpClient;

pub type CandidateSet = HashMap<String, TokenProfile>;

pub struct DexScreenerFeed {
    client: HttpClient,
    url: String,
}

impl DexScreenerFeed {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config).context("Failed to build feed client")?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl TokenFeed for DexScreenerFeed {
    async fn fetch_candidates(&self, chain: &str) -> Result<CandidateSet, FetchError> {
        if chain.trim().is_empty() {
            return Err(FetchError::EmptyChain);
        }

        info!("Fetching token profiles from {}", self.url);
        let body = self.client.get_text(&self.url).await?;
        let raw = parse_feed(&body)?;
        let total = raw.len();

        let candidates = filter_profiles(raw, chain);
        info!("{} of {} feed entries are {} tokens", candidates.len(), total, chain);
        Ok(candidates)
    }
}

/// Decode the feed body. The body itself must be a JSON array; elements that
/// are not profile-shaped are dropped here rather than failing the fetch.
pub fn parse_feed(body: &str) -> Result<Vec<RawTokenProfile>, FetchError> {
    let values: Vec<Value> = serde_json::from_str(body)?;

    let profiles = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!("Skipping feed element {}: {}", i, e);
                None
            }
        })
        .collect();

    Ok(profiles)
}

/// Keep entries tagged with `chain` that carry a token address. A repeated
/// address overwrites the earlier entry.
pub fn filter_profiles(raw: Vec<RawTokenProfile>, chain: &str) -> CandidateSet {
    let mut candidates = CandidateSet::new();

    for entry in raw {
        if entry.chain_id.as_deref() != Some(chain) {
            continue;
        }
        let Some(address) = entry.token_address else {
            debug!("Skipping {} entry without a token address", chain);
            continue;
        };

        let profile = TokenProfile {
            address: address.clone(),
            chain: chain.to_string(),
            dex_url: entry.url,
            icon: entry.icon,
            header: entry.header,
            open_graph: entry.open_graph,
            description: entry.description,
            links: entry.links.unwrap_or_default(),
        };
        candidates.insert(address, profile);
    }

    candidates
}
