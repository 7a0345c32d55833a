//! Headless Chromium renderer
//!
//! One browser process backs a renderer. The CDP event handler runs on its
//! own task for the lifetime of the browser. Pages are rendered one at a
//! time, each in a fresh tab that is closed on every exit path.

use super::{wait_until, PageRenderer, RenderError, RenderedPage};
use crate::config::RendererConfig;
use crate::url::resolve_link;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::ops::Deref;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// Renderer backed by a Chromium browser session
pub struct ChromiumRenderer {
    /// None once the session has been shut down
    browser: Mutex<Option<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl ChromiumRenderer {
    /// Launches a browser configured by `config`
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumRenderer)` - Browser is running and ready for pages
    /// * `Err(RenderError::Browser)` - Chromium could not be found or started
    pub async fn launch(config: &RendererConfig) -> Result<Self, RenderError> {
        let mut builder =
            BrowserConfig::builder().window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(RenderError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Browser(format!("failed to launch Chromium: {}", e)))?;

        // The handler must be polled for any CDP command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        tracing::debug!(
            "Launched Chromium (headless: {}, window: {}x{})",
            config.headless,
            config.window_width,
            config.window_height
        );

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler_task: Mutex::new(Some(handler_task)),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    /// Waits for image elements, then reads image and anchor attributes
    async fn scan(&self, page: &Page, url: &Url) -> Result<RenderedPage, RenderError> {
        let images = wait_until(self.wait_timeout, self.poll_interval, || async move {
            match page.find_elements("img").await {
                Ok(elements) if !elements.is_empty() => Some(elements),
                _ => None,
            }
        })
        .await
        .map_err(|timeout| RenderError::Timeout {
            url: url.to_string(),
            waited: timeout.0,
        })?;

        let base = document_url(page, url).await;
        let mut rendered = RenderedPage::new(url.clone());

        let (sources, stale) = read_attribute(&images, "src").await;
        rendered.stale_elements += stale;
        rendered
            .images
            .extend(sources.iter().filter_map(|src| resolve_link(src, &base)).map(String::from));

        // A page without anchors is a leaf, not a failure
        let anchors = match page.find_elements("a").await {
            Ok(anchors) => anchors,
            Err(e) => {
                tracing::debug!("No anchors read on {}: {}", url, e);
                Vec::new()
            }
        };
        let (hrefs, stale) = read_attribute(&anchors, "href").await;
        rendered.stale_elements += stale;
        rendered
            .links
            .extend(hrefs.iter().filter_map(|href| resolve_link(href, &base)).map(String::from));

        Ok(rendered)
    }
}

/// Returns the URL the tab settled on, which differs from the requested one
/// after a redirect
async fn document_url(page: &Page, requested: &Url) -> Url {
    let current = match page.url().await {
        Ok(current) => current,
        Err(e) => {
            tracing::debug!("Could not read document URL for {}: {}", requested, e);
            None
        }
    };

    current
        .and_then(|current| Url::parse(&current).ok())
        .filter(|current| matches!(current.scheme(), "http" | "https"))
        .unwrap_or_else(|| requested.clone())
}

/// Reads one attribute from each element
///
/// Returns the present values and the number of elements that could not be
/// read because they left the document in the meantime.
async fn read_attribute(elements: &[Element], name: &str) -> (Vec<String>, usize) {
    let mut values = Vec::with_capacity(elements.len());
    let mut stale = 0;

    for element in elements {
        match element.attribute(name).await {
            Ok(Some(value)) => values.push(value),
            Ok(None) => {}
            Err(e) => {
                tracing::trace!("Skipping stale element ({}): {}", name, e);
                stale += 1;
            }
        }
    }

    (values, stale)
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError> {
        let browser = self.browser.lock().await;
        let browser = browser
            .as_ref()
            .ok_or_else(|| RenderError::Browser("browser session already shut down".to_string()))?;

        let page = browser
            .new_page(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let tab = TabGuard::new(page, url.to_string());
        let result = self.scan(&tab, url).await;
        tab.close().await;

        result
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            browser
                .close()
                .await
                .map_err(|e| RenderError::Browser(format!("failed to close browser: {}", e)))?;
            if let Err(e) = browser.wait().await {
                tracing::debug!("Browser process did not exit cleanly: {}", e);
            }
        }

        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }

        Ok(())
    }
}

/// Closes its tab when dropped
///
/// `close()` is the normal path; the drop path covers early returns and
/// cancelled futures by closing the tab on a background task.
struct TabGuard {
    page: Page,
    url: String,
    closed: bool,
}

impl TabGuard {
    fn new(page: Page, url: String) -> Self {
        Self {
            page,
            url,
            closed: false,
        }
    }

    async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.page.clone().close().await {
            tracing::warn!("Failed to close tab for {}: {}", self.url, e);
        }
    }
}

impl Deref for TabGuard {
    type Target = Page;

    fn deref(&self) -> &Self::Target {
        &self.page
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let page = self.page.clone();
        let url = std::mem::take(&mut self.url);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::debug!("Deferred tab close failed for {}: {}", url, e);
                }
            });
        }
    }
}
