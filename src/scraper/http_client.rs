use crate::config::FeedConfig;
use crate::error::FetchError;
use anyhow::{Context, Result};
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub struct HttpClient {
    inner: reqwest::Client,
    config: FeedConfig,
}

impl HttpClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// Fetch a URL as text, retrying transport errors and 429/5xx.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.config.max_retries + 1;
        let mut last_err: Option<String> = None;

        for attempt in 1..=attempts {
            debug!("GET {} (attempt {})", url, attempt);

            match self.inner.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp.text().await.map_err(|source| FetchError::Http {
                            url: url.to_string(),
                            source,
                        });
                    }
                    if !is_retryable(status.as_u16()) {
                        // Don't retry 4xx other than 429
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                    warn!("{} answered {} on attempt {}", url, status, attempt);
                    last_err = Some(format!("HTTP {}", status));
                }
                Err(source) if attempts == 1 => {
                    return Err(FetchError::Http {
                        url: url.to_string(),
                        source,
                    });
                }
                Err(e) => {
                    warn!("Request failed on attempt {}: {}", attempt, e);
                    last_err = Some(e.to_string());
                }
            }

            if attempt < attempts {
                sleep(self.backoff(attempt)).await;
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last: last_err.unwrap_or_else(|| "no attempts made".to_string()),
        })
    }

    /// Linear backoff plus random jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let jitter = if self.config.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.config.jitter_ms)
        };
        Duration::from_millis(self.config.retry_delay_ms * attempt as u64 + jitter)
    }
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}
