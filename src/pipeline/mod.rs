//! Scan orchestrator: drives the page scraper over candidates.
//!
//! ## Run modes
//!
//! `scan_one()`: one address, one page load. A failure comes back as `None`;
//!   the cause is logged here and the caller prints its own notice.
//!
//! `scan_all()`: every candidate, strictly one after another on the caller's
//!   session. A failed token is logged, recorded in the report and skipped.
//!
//! `scan_all_pooled()`: the same batch spread over several independent
//!   sessions, one worker per session pulling from a shared queue. Records
//!   come back in completion order. A worker whose session dies stops; what
//!   no worker could take is reported as failed, never dropped.

use crate::error::{ScrapeCause, ScrapeError};
use crate::models::ScanRecord;
use crate::scraper::{BrowserSession, CandidateSet, PageScraper};
use crate::utils::Timer;
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Called with the number of candidates still waiting to be scanned.
pub type Progress<'a> = &'a (dyn Fn(usize) + Sync);

pub struct Scanner {
    scraper: PageScraper,
}

impl Scanner {
    pub fn new(scraper: PageScraper) -> Self {
        Self { scraper }
    }

    pub async fn scan_one<S>(&self, session: &mut S, address: &str) -> Option<ScanRecord>
    where
        S: BrowserSession + ?Sized,
    {
        match self.scraper.scrape_token(session, address).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Scrape failed: {}", e);
                None
            }
        }
    }

    pub async fn scan_all<S>(&self, session: &mut S, candidates: &CandidateSet, progress: Progress<'_>) -> ScanReport
    where
        S: BrowserSession,
    {
        self.scan_all_pooled(std::slice::from_mut(session), candidates, progress)
            .await
    }

    pub async fn scan_all_pooled<S>(
        &self,
        sessions: &mut [S],
        candidates: &CandidateSet,
        progress: Progress<'_>,
    ) -> ScanReport
    where
        S: BrowserSession,
    {
        let total = candidates.len();
        let _t = Timer::start(format!("Scan on {} session(s)", sessions.len()), total);

        let queue = Mutex::new(candidates.keys().cloned().collect::<VecDeque<_>>());
        let remaining = AtomicUsize::new(total);
        progress(total);

        let workers = sessions.iter_mut().enumerate().map(|(worker, session)| {
            let queue = &queue;
            let remaining = &remaining;
            async move {
                let mut records = Vec::new();
                let mut failures = Vec::new();

                loop {
                    let Some(address) = queue.lock().await.pop_front() else {
                        break;
                    };

                    match self.scraper.scrape_token(&mut *session, &address).await {
                        Ok(record) => {
                            info!("[worker {}] {}: {} ({})", worker, address, record.name, record.score);
                            records.push(record);
                        }
                        Err(e) => {
                            warn!("[worker {}] scrape failed: {}", worker, e);
                            failures.push(e);
                        }
                    }

                    let left = remaining.fetch_sub(1, Ordering::SeqCst) - 1;
                    progress(left);

                    if !session.is_alive() {
                        warn!("[worker {}] browser session lost, worker stopping", worker);
                        break;
                    }
                }

                (records, failures)
            }
        });

        let mut report = ScanReport {
            total,
            ..ScanReport::default()
        };
        for (records, failures) in join_all(workers).await {
            report.records.extend(records);
            report.failures.extend(failures);
        }

        // Every worker gone (or none to begin with): nothing else will drain the queue.
        let stranded = queue.into_inner();
        if !stranded.is_empty() {
            error!("No live browser session, {} token(s) left unscanned", stranded.len());
            report.failures.extend(
                stranded
                    .into_iter()
                    .map(|address| ScrapeError::new(address, ScrapeCause::NoSession)),
            );
            progress(0);
        }

        info!(
            "Scan done: {} ok | {} failed | {} total",
            report.records.len(),
            report.failures.len(),
            report.total
        );
        report
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub total: usize,
    pub records: Vec<ScanRecord>,
    pub failures: Vec<ScrapeError>,
}
