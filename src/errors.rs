//! Error types for row extraction, per-target sessions and whole runs

use std::path::PathBuf;

use thiserror::Error;

use crate::models::MatchRecord;

/// Failure reported by a browser driver (CDP error, bad selector, parse error).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self(message.to_string())
    }
}

/// Why [`BrowserDriver::open`](crate::traits::BrowserDriver::open) produced no page.
#[derive(Debug, Clone, Error)]
pub enum OpenError {
    /// The browser process could not be started
    #[error("{0}")]
    Launch(DriverError),
    /// The browser started but a context or page could not be created
    #[error("{0}")]
    Page(DriverError),
}

/// Why a single row was skipped. Never fatal to the page.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("expected at least 2 team links, found {found}")]
    MissingTeams { found: usize },
    #[error("team link {position} has no usable title")]
    MissingTitle { position: usize },
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Failure of one scrape target. Contained by the orchestrator.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("failed to open a browser page: {0}")]
    PageOpen(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("navigation to {url} timed out after {secs}s")]
    NavigationTimeout { url: String, secs: u64 },
    #[error("no element matching `{selector}` appeared within {secs}s")]
    NotReady { selector: String, secs: u64 },
    #[error("browser driver error: {0}")]
    Driver(#[from] DriverError),
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The page was scraped but writing it out failed; the records are kept.
    #[error("failed to save {} scraped matches to {}: {source}", records.len(), path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        records: Vec<MatchRecord>,
    },
}

impl ScrapeError {
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch(_))
    }

    /// Whether a browser process was running when the target failed
    pub fn browser_started(&self) -> bool {
        !matches!(self, Self::Launch(_) | Self::OutputDir { .. })
    }
}

/// Failure of a whole orchestrator run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("browser unavailable: {0}")]
    Launch(#[source] ScrapeError),
    #[error("scrape run timed out after {secs}s")]
    Timeout { secs: u64 },
}
