//! One browser session against one scrape target.
//!
//! A session launches its own browser, navigates, waits for the listing to
//! render, extracts every row and writes the per-sport CSV/JSON files. The
//! browser is torn down on every exit path once it has been launched.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, sleep, timeout};
use tracing::{error, info, warn};

use crate::errors::{OpenError, ScrapeError};
use crate::extractor::{RowContext, SkippedRow};
use crate::models::{MatchRecord, ScrapeTarget};
use crate::output::{self, SavedFiles};
use crate::traits::{BrowserDriver, BrowserPage, LaunchOptions, SiteSelectors};

/// Timing and location settings shared by every session of a run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Root directory; each target writes into its own subfolder
    pub output_root: PathBuf,
    pub selectors: SiteSelectors,
    pub navigation_timeout: Duration,
    /// Fixed wait after navigation for client-side rendering
    pub settle_delay: Duration,
    /// Upper bound on waiting for the readiness marker
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            selectors: SiteSelectors::default(),
            navigation_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(5),
            ready_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// What one session produced
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub records: Vec<MatchRecord>,
    /// Number of row containers found on the page
    pub rows_found: usize,
    pub skipped: Vec<SkippedRow>,
    /// `None` when there was nothing to write
    pub saved: Option<SavedFiles>,
}

/// Scrapes targets one session at a time with a shared driver and config
#[derive(Clone)]
pub struct SportSession {
    driver: Arc<dyn BrowserDriver>,
    launch: LaunchOptions,
    config: SessionConfig,
}

impl SportSession {
    pub fn new(driver: Arc<dyn BrowserDriver>, launch: LaunchOptions, config: SessionConfig) -> Self {
        Self {
            driver,
            launch,
            config,
        }
    }

    /// Run a session stamped with the current time.
    pub async fn run(&self, target: &ScrapeTarget) -> Result<SessionReport, ScrapeError> {
        self.run_at(target, Utc::now()).await
    }

    /// Run a session with `now` as the clock for placeholder datetimes and
    /// file names.
    pub async fn run_at(
        &self,
        target: &ScrapeTarget,
        now: DateTime<Utc>,
    ) -> Result<SessionReport, ScrapeError> {
        let tag = target.tag();
        let output_dir = self.config.output_root.join(&target.output_folder);
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| ScrapeError::OutputDir {
                path: output_dir.clone(),
                source,
            })?;

        info!("[{}] Opening {} browser for {}", tag, self.driver.name(), target.url);
        let page = self
            .driver
            .open(&self.launch)
            .await
            .map_err(|e| match e {
                OpenError::Launch(e) => ScrapeError::Launch(e.to_string()),
                OpenError::Page(e) => ScrapeError::PageOpen(e.to_string()),
            })?;

        let scraped = self.scrape_page(page.as_ref(), target, now).await;

        if let Err(e) = page.close().await {
            warn!("[{}] Browser teardown failed: {}", tag, e);
        }

        let (records, rows_found, skipped) = scraped?;

        if records.is_empty() {
            warn!("[{}] No matches scraped.", tag);
            return Ok(SessionReport {
                records,
                rows_found,
                skipped,
                saved: None,
            });
        }

        let stem = output::sport_file_stem(&target.sport, now);
        match output::write_records(&output_dir, &stem, &records).await {
            Ok(saved) => {
                for path in &saved.replaced {
                    warn!("[{}] Replaced earlier output {}", tag, path.display());
                }
                info!("[{}] Saved {} matches to CSV {}", tag, records.len(), saved.csv.display());
                info!("[{}] Saved {} matches to JSON {}", tag, records.len(), saved.json.display());
                Ok(SessionReport {
                    records,
                    rows_found,
                    skipped,
                    saved: Some(saved),
                })
            }
            Err(failure) => {
                error!(
                    "[{}] Could not write {}; {} scraped matches remain in memory only: {}",
                    tag,
                    failure.path.display(),
                    records.len(),
                    failure.source
                );
                Err(ScrapeError::Persist {
                    path: failure.path,
                    source: failure.source,
                    records,
                })
            }
        }
    }

    async fn scrape_page(
        &self,
        page: &dyn BrowserPage,
        target: &ScrapeTarget,
        now: DateTime<Utc>,
    ) -> Result<(Vec<MatchRecord>, usize, Vec<SkippedRow>), ScrapeError> {
        let tag = target.tag();
        let selectors = &self.config.selectors;

        match timeout(self.config.navigation_timeout, page.goto(&target.url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: target.url.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ScrapeError::NavigationTimeout {
                    url: target.url.clone(),
                    secs: self.config.navigation_timeout.as_secs(),
                });
            }
        }

        sleep(self.config.settle_delay).await;
        self.wait_for_marker(page, &selectors.ready_marker).await?;

        let rows = page.query_all(&selectors.row_container).await?;
        info!("[{}] Found {} match rows", tag, rows.len());

        let context = RowContext {
            target,
            selectors,
            now,
        };
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if let Some(record) = context.extract(row.as_ref(), index, &mut skipped).await {
                records.push(record);
            }
        }

        Ok((records, rows.len(), skipped))
    }

    /// Poll until `selector` matches at least one element.
    async fn wait_for_marker(&self, page: &dyn BrowserPage, selector: &str) -> Result<(), ScrapeError> {
        let deadline = Instant::now() + self.config.ready_timeout;
        loop {
            let found = timeout(
                deadline.saturating_duration_since(Instant::now()),
                page.query_all(selector),
            )
            .await;
            match found {
                Ok(Ok(elements)) if !elements.is_empty() => return Ok(()),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(ScrapeError::Driver(e)),
                Err(_) => break,
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(self.config.poll_interval).await;
        }

        Err(ScrapeError::NotReady {
            selector: selector.to_string(),
            secs: self.config.ready_timeout.as_secs(),
        })
    }
}
