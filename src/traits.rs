//! Traits and interfaces for browser-agnostic scraping

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{DriverError, OpenError};

/// CSS selectors for the parts of a fixture listing page
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Element whose appearance means the page has rendered
    pub ready_marker: String,
    /// Container selector for individual match rows
    pub row_container: String,
    /// Team link selector within a row; the team name is in `team_attribute`
    pub team_link: String,
    /// Attribute of a team link carrying the team name
    pub team_attribute: String,
    /// Default odds cell selector within a row
    pub odds: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            ready_marker: r#"div[data-testid="game-row"]"#.to_string(),
            row_container: r#"div[data-testid="game-row"]"#.to_string(),
            team_link: "a[title]".to_string(),
            team_attribute: "title".to_string(),
            odds: r#"p[data-testid="odd-container-default"]"#.to_string(),
        }
    }
}

/// How to launch the browser for one session
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub user_agent: String,
    /// `scheme://host:port`, passed through without validation
    pub proxy: Option<String>,
    pub headless: bool,
    /// Upper bound for a single browser round-trip
    pub request_timeout: Duration,
}

/// Launches isolated browser sessions.
///
/// Every page returned by [`BrowserDriver::open`] owns its own browser
/// instance and context; nothing is shared between pages.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Launch a browser, open a fresh context configured from `options`
    /// and return a blank page in it.
    ///
    /// # Returns
    /// * `Result<Box<dyn BrowserPage>, OpenError>` - The page, or whether the
    ///   browser failed to start or only the page failed to open
    async fn open(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserPage>, OpenError>;
}

/// A live page inside an isolated browser context
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the load to finish
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// All elements in the page matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError>;

    /// Release the page, its context and the browser.
    ///
    /// Must be called on every exit path after a successful `open`.
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

/// A handle to one rendered element
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Descendants matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError>;

    /// Value of `name`, or `None` when the attribute is absent
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;

    /// Rendered text content
    async fn inner_text(&self) -> Result<String, DriverError>;
}
