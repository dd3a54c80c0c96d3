use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Wall-clock timer for a batch of token scans. Logs the elapsed time and
/// the per-token average when dropped.
pub struct Timer {
    label: String,
    tokens: usize,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>, tokens: usize) -> Self {
        let label = label.into();
        debug!("{}: started", label);
        Self {
            label,
            tokens,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Mean time spent per token; `None` for an empty batch.
    pub fn per_token(&self) -> Option<Duration> {
        u32::try_from(self.tokens)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| self.elapsed() / n)
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        match self.per_token() {
            Some(avg) => info!(
                "{}: {} token(s) in {:.2?} ({:.2?} each)",
                self.label,
                self.tokens,
                self.elapsed(),
                avg
            ),
            None => info!("{}: nothing to scan", self.label),
        }
    }
}
