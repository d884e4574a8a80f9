//! Browser driver that serves saved HTML snapshots instead of live pages.
//!
//! Used by `--replay` and by the tests. Documents are parsed with `scraper`
//! on every query so no parsed tree is held across an await point.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::errors::{DriverError, OpenError};
use crate::models::ScrapeTarget;
use crate::traits::{BrowserDriver, BrowserPage, ElementHandle, LaunchOptions};

/// Serves pages from an in-memory URL to HTML map
#[derive(Clone, Default)]
pub struct SnapshotDriver {
    pages: Arc<HashMap<String, String>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl SnapshotDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `html` as the content served for `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.into(), html.into());
        self
    }

    /// Load `<dir>/<sport>.html` for each target that has one.
    ///
    /// Targets without a snapshot are left unregistered, so navigating to
    /// them fails like an unreachable site would.
    pub async fn from_dir(dir: &Path, targets: &[ScrapeTarget]) -> std::io::Result<Self> {
        let mut driver = Self::new();
        for target in targets {
            let path = dir.join(format!("{}.html", target.sport));
            match tokio::fs::read_to_string(&path).await {
                Ok(html) => {
                    debug!("Loaded snapshot {} for {}", path.display(), target.url);
                    driver = driver.with_page(target.url.clone(), html);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    info!("[{}] No snapshot at {}", target.tag(), path.display());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(driver)
    }

    /// Pages opened but not yet closed
    #[cfg(test)]
    pub fn live_pages(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for SnapshotDriver {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn open(&self, _options: &LaunchOptions) -> Result<Box<dyn BrowserPage>, OpenError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SnapshotPage {
            pages: Arc::clone(&self.pages),
            current: Mutex::new(None),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct SnapshotPage {
    pages: Arc<HashMap<String, String>>,
    current: Mutex<Option<String>>,
    closed: Arc<AtomicUsize>,
}

impl SnapshotPage {
    fn document(&self) -> Result<String, DriverError> {
        let current = self
            .current
            .lock()
            .map_err(|_| DriverError::new("snapshot page lock poisoned"))?;
        current
            .clone()
            .ok_or_else(|| DriverError::new("page has not navigated anywhere"))
    }
}

#[async_trait]
impl BrowserPage for SnapshotPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| DriverError::new(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))?;
        let mut current = self
            .current
            .lock()
            .map_err(|_| DriverError::new("snapshot page lock poisoned"))?;
        *current = Some(html.clone());
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.document()?);
        Ok(document
            .select(&selector)
            .map(|el| Box::new(SnapshotElement { html: el.html() }) as Box<dyn ElementHandle>)
            .collect())
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An element captured as its outer HTML
struct SnapshotElement {
    html: String,
}

impl SnapshotElement {
    /// Re-parse the captured HTML and hand its root element to `f`
    fn with_root<T>(&self, f: impl FnOnce(ElementRef<'_>) -> T) -> Result<T, DriverError> {
        let fragment = Html::parse_fragment(&self.html);
        let root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .ok_or_else(|| DriverError::new("element is detached"))?;
        Ok(f(root))
    }
}

#[async_trait]
impl ElementHandle for SnapshotElement {
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError> {
        let selector = parse_selector(selector)?;
        self.with_root(|root| {
            root.select(&selector)
                .filter(|el| el.id() != root.id())
                .map(|el| Box::new(SnapshotElement { html: el.html() }) as Box<dyn ElementHandle>)
                .collect()
        })
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.with_root(|root| root.value().attr(name).map(str::to_string))
    }

    async fn inner_text(&self) -> Result<String, DriverError> {
        self.with_root(|root| root.text().collect::<String>())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DriverError> {
    Selector::parse(selector)
        .map_err(|e| DriverError::new(format!("invalid selector `{selector}`: {e:?}")))
}
