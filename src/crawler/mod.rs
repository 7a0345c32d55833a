//! Crawler module for page traversal and image collection
//!
//! This module contains the core crawling logic, including:
//! - The immutable crawl request
//! - Per-invocation traversal state (visited set, statistics)
//! - Depth-first traversal with scope filtering and image downloads

mod context;
mod engine;
mod request;

pub use context::{CrawlContext, VisitedSet};
pub use engine::{Crawler, DEFAULT_MAX_CONCURRENT_DOWNLOADS};
pub use request::CrawlRequest;

use crate::config::{validate, Config};
use crate::download::ImageDownloader;
use crate::output::CrawlStats;
use crate::render::launch_renderer;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl for one start page
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the configuration
/// 2. Start a render session for the configured renderer
/// 3. Build the image downloader
/// 4. Traverse pages and download images
/// 5. Release the render session, whether or not the crawl succeeded
///
/// # Arguments
///
/// * `config` - The effective configuration
/// * `request` - What to crawl
/// * `cancel` - Token that stops the crawl early
///
/// # Example
///
/// ```no_run
/// use image_harvester::config::Config;
/// use image_harvester::crawler::{crawl, CrawlRequest};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let request = CrawlRequest::new("https://example.com/", ".")?;
/// let stats = crawl(&config, &request, CancellationToken::new()).await?;
/// println!("{} images saved", stats.images_saved);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    request: &CrawlRequest,
    cancel: CancellationToken,
) -> Result<CrawlStats, HarvestError> {
    validate(config)?;

    let downloader = ImageDownloader::from_user_agent(&config.user_agent)?;
    let renderer = launch_renderer(config).await?;

    let crawler = Crawler::new(renderer.clone(), downloader)
        .with_max_concurrent_downloads(config.crawler.max_concurrent_downloads)
        .with_cancellation(cancel);

    let result = crawler.crawl(request).await;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("Failed to release render session: {}", e);
    }

    Ok(result?)
}
