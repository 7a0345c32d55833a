//! Page rendering
//!
//! A renderer opens a URL, waits until the page exposes at least one image
//! element, and reports the page's image sources and anchor targets as
//! absolute URLs. Two implementations are provided:
//! - `ChromiumRenderer`: a headless Chromium session driven over CDP
//! - `StaticRenderer`: a plain HTTP GET with HTML parsing (no JavaScript)

mod chromium;
mod static_html;
mod wait;

pub use chromium::ChromiumRenderer;
pub use static_html::{parse_page, StaticRenderer};
pub use wait::{wait_until, WaitTimeout};

use crate::config::{Config, RendererKind};
use crate::download::build_http_client;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Timed out after {waited:?} waiting for image elements on {url}")]
    Timeout { url: String, waited: Duration },

    #[error("Failed to load {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// What a renderer found on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// The URL that was requested
    pub url: Url,

    /// Absolute URLs of `<img src>` values, in document order
    pub images: Vec<String>,

    /// Absolute URLs of `<a href>` values, in document order
    pub links: Vec<String>,

    /// Elements whose attributes could no longer be read
    pub stale_elements: usize,
}

impl RenderedPage {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            images: Vec::new(),
            links: Vec::new(),
            stale_elements: 0,
        }
    }
}

/// Renders pages for the crawler
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders `url` and returns its images and links
    ///
    /// Fails with `RenderError::Timeout` when no image element appears
    /// within the renderer's wait window.
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError>;

    /// Releases the render session
    ///
    /// Called once after a crawl invocation; rendering afterwards fails.
    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Starts the renderer selected by the configuration
pub async fn launch_renderer(config: &Config) -> Result<Arc<dyn PageRenderer>, RenderError> {
    match config.renderer.kind {
        RendererKind::Chromium => {
            let renderer = ChromiumRenderer::launch(&config.renderer).await?;
            Ok(Arc::new(renderer))
        }
        RendererKind::Static => {
            let client = build_http_client(&config.user_agent)
                .map_err(|e| RenderError::Browser(format!("HTTP client: {}", e)))?;
            Ok(Arc::new(StaticRenderer::new(client)))
        }
    }
}
