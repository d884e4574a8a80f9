//! Runs one session per target and aggregates the results

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::{StreamExt, stream};
use tracing::{error, info};

use crate::errors::{RunError, ScrapeError};
use crate::extractor::SkippedRow;
use crate::models::{MatchRecord, ScrapeTarget};
use crate::progress::LogSink;
use crate::session::{SessionReport, SportSession};

/// Upper bound on browsers running at once
pub const MAX_CONCURRENCY: usize = 5;

/// How one target ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub sport: String,
    pub label: String,
    /// Records this target contributed to the aggregate
    pub matches: usize,
    /// Row containers found on the page
    pub rows: usize,
    pub skipped: Vec<SkippedRow>,
    pub error: Option<String>,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub scrape_date: NaiveDate,
    /// Every record, grouped by target in target order
    pub records: Vec<MatchRecord>,
    /// One entry per target, in target order
    pub outcomes: Vec<TargetOutcome>,
}

impl RunSummary {
    pub fn failed_targets(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

pub struct Orchestrator {
    session: SportSession,
    sink: Arc<dyn LogSink>,
    concurrency: usize,
}

impl Orchestrator {
    /// Sequential orchestrator reporting progress to `sink`
    pub fn new(session: SportSession, sink: Arc<dyn LogSink>) -> Self {
        Self {
            session,
            sink,
            concurrency: 1,
        }
    }

    /// Allow up to `n` targets in flight, clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// [`Orchestrator::run`] bounded by a wall-clock `limit` for the whole run.
    ///
    /// Targets finished before the limit have already written their files.
    pub async fn run_with_timeout(
        &self,
        targets: &[ScrapeTarget],
        scrape_date: NaiveDate,
        limit: Duration,
    ) -> Result<RunSummary, RunError> {
        match tokio::time::timeout(limit, self.run(targets, scrape_date)).await {
            Ok(result) => result,
            Err(_) => {
                self.sink
                    .append(&format!("Scraping timed out after {} seconds", limit.as_secs()));
                Err(RunError::Timeout {
                    secs: limit.as_secs(),
                })
            }
        }
    }

    /// Scrape every target, isolating failures per target.
    ///
    /// Only a browser that cannot be launched at all ends the run early.
    pub async fn run(
        &self,
        targets: &[ScrapeTarget],
        scrape_date: NaiveDate,
    ) -> Result<RunSummary, RunError> {
        self.sink.append("Starting scraping process...");
        self.sink.append(&format!(
            "Scraping matches for date: {}",
            scrape_date.format("%Y%m%d")
        ));
        info!(
            "Scraping {} targets with up to {} browsers",
            targets.len(),
            self.concurrency
        );

        let mut finished = stream::iter(targets.iter().cloned())
            .map(|target| async move {
                self.sink.append(&format!("Scraping {} matches...", target.label));
                let result = self.session.run(&target).await;
                (target, result)
            })
            .buffered(self.concurrency);

        let mut records = Vec::new();
        let mut outcomes = Vec::with_capacity(targets.len());
        let mut browser_started = false;

        while let Some((target, result)) = finished.next().await {
            let outcome = match result {
                Ok(report) => {
                    browser_started = true;
                    self.record_success(&target, report, &mut records)
                }
                // Nothing has launched yet, so no later target can either.
                Err(e) if e.is_launch_failure() && !browser_started => {
                    error!("[{}] {}", target.tag(), e);
                    self.sink
                        .append(&format!("{}: 0 matches, error: {}", target.label, e));
                    return Err(RunError::Launch(e));
                }
                Err(e) => {
                    browser_started |= e.browser_started();
                    self.record_failure(&target, e, &mut records)
                }
            };
            outcomes.push(outcome);
        }

        self.sink.append(&format!(
            "Scraping completed! Total matches found: {}",
            records.len()
        ));

        Ok(RunSummary {
            scrape_date,
            records,
            outcomes,
        })
    }

    fn record_success(
        &self,
        target: &ScrapeTarget,
        report: SessionReport,
        records: &mut Vec<MatchRecord>,
    ) -> TargetOutcome {
        let matches = report.records.len();
        self.sink
            .append(&format!("{}: Found {} matches", target.label, matches));
        if !report.skipped.is_empty() {
            self.sink.append(&format!(
                "{}: Skipped {} of {} rows",
                target.label,
                report.skipped.len(),
                report.rows_found
            ));
        }
        if report.saved.is_some() {
            self.sink
                .append(&format!("Saved {} data to files", target.label));
        }
        records.extend(report.records);

        TargetOutcome {
            sport: target.sport.clone(),
            label: target.label.clone(),
            matches,
            rows: report.rows_found,
            skipped: report.skipped,
            error: None,
        }
    }

    fn record_failure(
        &self,
        target: &ScrapeTarget,
        e: ScrapeError,
        records: &mut Vec<MatchRecord>,
    ) -> TargetOutcome {
        let message = e.to_string();
        error!("[{}] Error during scraping: {}", target.tag(), message);

        // Scraped but unsaved matches still belong in the aggregate.
        let kept = match e {
            ScrapeError::Persist { records, .. } => records,
            _ => Vec::new(),
        };
        self.sink.append(&format!(
            "{}: {} matches, error: {}",
            target.label,
            kept.len(),
            message
        ));

        let matches = kept.len();
        records.extend(kept);

        TargetOutcome {
            sport: target.sport.clone(),
            label: target.label.clone(),
            matches,
            rows: 0,
            skipped: Vec::new(),
            error: Some(message),
        }
    }
}
