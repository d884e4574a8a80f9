//! Headless Chromium driver over the DevTools protocol

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{CreateBrowserContextParams, CreateTargetParams};
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{DriverError, OpenError};
use crate::traits::{BrowserDriver, BrowserPage, ElementHandle, LaunchOptions};

/// Hides `navigator.webdriver` from page scripts
const AUTOMATION_FLAG: &str = "--disable-blink-features=AutomationControlled";

/// Launches a dedicated Chromium process per session
#[derive(Debug, Clone, Default)]
pub struct ChromiumDriver;

impl ChromiumDriver {
    pub fn new() -> Self {
        Self
    }

    fn launch_args(options: &LaunchOptions) -> Vec<String> {
        let mut args = vec![
            AUTOMATION_FLAG.to_string(),
            format!("--user-agent={}", options.user_agent),
        ];
        if let Some(proxy) = &options.proxy {
            args.push(format!("--proxy-server={proxy}"));
        }
        args
    }

    fn browser_config(options: &LaunchOptions) -> Result<BrowserConfig, DriverError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(options.request_timeout)
            .window_size(1280, 800)
            .args(Self::launch_args(options));

        if !options.headless {
            builder = builder.with_head();
        }

        builder.build().map_err(DriverError::new)
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn open(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserPage>, OpenError> {
        let config = Self::browser_config(options).map_err(OpenError::Launch)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| OpenError::Launch(DriverError::new(e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        match open_context_page(&mut browser).await {
            Ok((context, page)) => Ok(Box::new(ChromiumPage {
                page,
                context,
                browser: Mutex::new(browser),
                handler_task,
            })),
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Failed to close browser after page open error: {}", close_err);
                }
                if let Err(wait_err) = browser.wait().await {
                    warn!("Failed to wait for browser exit after page open error: {}", wait_err);
                }
                handler_task.abort();
                Err(OpenError::Page(e))
            }
        }
    }
}

async fn open_context_page(browser: &mut Browser) -> Result<(BrowserContextId, Page), DriverError> {
    let context = browser
        .create_browser_context(CreateBrowserContextParams::default())
        .await
        .map_err(DriverError::new)?;

    let mut params = CreateTargetParams::new("about:blank");
    params.browser_context_id = Some(context.clone());
    let page = browser.new_page(params).await.map_err(DriverError::new)?;

    Ok((context, page))
}

struct ChromiumPage {
    page: Page,
    context: BrowserContextId,
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.page.goto(url).await.map_err(DriverError::new)?;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(DriverError::new)?;
        Ok(wrap(elements))
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        let this = *self;
        let mut first_error = None;

        if let Err(e) = this.page.clone().close().await {
            first_error.get_or_insert(DriverError::new(format!("closing page: {e}")));
        }

        let mut browser = this.browser.lock().await;
        if let Err(e) = browser.dispose_browser_context(this.context.clone()).await {
            first_error.get_or_insert(DriverError::new(format!("disposing context: {e}")));
        }
        if let Err(e) = browser.close().await {
            first_error.get_or_insert(DriverError::new(format!("closing browser: {e}")));
        }
        if let Err(e) = browser.wait().await {
            first_error.get_or_insert(DriverError::new(format!("waiting for browser exit: {e}")));
        }
        drop(browser);

        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        // The browser process itself is killed by `Browser`'s own drop.
        self.handler_task.abort();
    }
}

struct ChromiumElement {
    element: Element,
}

fn wrap(elements: Vec<Element>) -> Vec<Box<dyn ElementHandle>> {
    elements
        .into_iter()
        .map(|element| Box::new(ChromiumElement { element }) as Box<dyn ElementHandle>)
        .collect()
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError> {
        let elements = self
            .element
            .find_elements(selector)
            .await
            .map_err(DriverError::new)?;
        Ok(wrap(elements))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.element.attribute(name).await.map_err(DriverError::new)
    }

    async fn inner_text(&self) -> Result<String, DriverError> {
        let text = self.element.inner_text().await.map_err(DriverError::new)?;
        Ok(text.unwrap_or_default())
    }
}
