//! Crawl engine - depth-first traversal of same-site pages
//!
//! The traversal keeps an explicit stack of `(url, depth)` pairs instead of
//! recursing. For every rendered page it:
//! 1. Downloads the page's images
//! 2. Filters the page's links by scope and the visited set
//! 3. Downloads direct image links
//! 4. Pushes the remaining links one level deeper
//!
//! A link's depth is fixed when it is discovered. Links are pushed in
//! reverse document order so the first link's subtree is explored before
//! its next sibling, matching a recursive depth-first walk.

use super::context::CrawlContext;
use super::request::CrawlRequest;
use crate::download::ImageDownloader;
use crate::output::CrawlStats;
use crate::render::{PageRenderer, RenderError, RenderedPage};
use crate::url::is_direct_image_link;
use crate::CrawlError;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default number of image downloads in flight for one page
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 4;

/// Links a page contributes to the traversal
#[derive(Debug, Default)]
struct DiscoveredLinks {
    /// Anchors pointing straight at image files
    images: Vec<String>,
    /// Pages to render at the next depth, in document order
    pages: Vec<Url>,
}

/// Crawls pages with one renderer and one downloader
pub struct Crawler {
    renderer: Arc<dyn PageRenderer>,
    downloader: ImageDownloader,
    max_concurrent_downloads: usize,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new(renderer: Arc<dyn PageRenderer>, downloader: ImageDownloader) -> Self {
        Self {
            renderer,
            downloader,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_concurrent_downloads(mut self, max: usize) -> Self {
        self.max_concurrent_downloads = max.max(1);
        self
    }

    /// Uses `cancel` to stop the crawl early
    ///
    /// Once the token is cancelled no further page is rendered; a render in
    /// progress is abandoned.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a handle that cancels this crawler
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs one crawl invocation
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - Traversal finished (or was cancelled after the
    ///   start page); individual failures are only counted
    /// * `Err(CrawlError)` - The output directory is missing, or the start
    ///   page could not be rendered
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlStats, CrawlError> {
        if !request.output_dir.is_dir() {
            return Err(CrawlError::MissingOutputDir(
                request.output_dir.display().to_string(),
            ));
        }

        tracing::info!(
            "Crawling {} (max depth {}, base url '{}')",
            request.start_url,
            request.max_depth,
            request.scope.base_url()
        );

        let mut ctx = CrawlContext::new();
        ctx.visited.insert(request.start_url.as_str());

        let mut stack: Vec<(Url, u32)> = vec![(request.start_url.clone(), 0)];

        while let Some((page_url, depth)) = stack.pop() {
            if depth > request.max_depth {
                tracing::trace!("Not rendering {} at depth {}", page_url, depth);
                ctx.stats.pages_beyond_depth += 1;
                continue;
            }

            let rendered = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = self.renderer.render(&page_url) => Some(result),
            };

            let page = match rendered {
                None if depth == 0 => {
                    return Err(CrawlError::Cancelled(page_url.to_string()));
                }
                None => {
                    tracing::info!(
                        "Crawl of {} cancelled with {} pages left",
                        request.start_url,
                        stack.len() + 1
                    );
                    break;
                }
                Some(Ok(page)) => page,
                Some(Err(source)) if depth == 0 => {
                    return Err(CrawlError::RootRender {
                        url: page_url.to_string(),
                        source,
                    });
                }
                Some(Err(e)) => {
                    tracing::warn!("Skipping branch at {}: {}", page_url, e);
                    match e {
                        RenderError::Timeout { .. } => ctx.stats.render_timeouts += 1,
                        _ => ctx.stats.render_failures += 1,
                    }
                    continue;
                }
            };

            ctx.stats.pages_rendered += 1;
            ctx.stats.stale_elements += page.stale_elements as u64;
            tracing::debug!(
                "Rendered {} at depth {}: {} images, {} links",
                page_url,
                depth,
                page.images.len(),
                page.links.len()
            );

            self.download_all(&mut ctx, &page.images, request).await;

            let discovered = discover_links(&mut ctx, &page, request);
            self.download_all(&mut ctx, &discovered.images, request).await;

            stack.extend(
                discovered
                    .pages
                    .into_iter()
                    .rev()
                    .map(|url| (url, depth + 1)),
            );
        }

        tracing::info!(
            "Finished {}: {} pages rendered, {} images saved",
            request.start_url,
            ctx.stats.pages_rendered,
            ctx.stats.images_saved
        );

        Ok(ctx.stats)
    }

    /// Downloads a batch of images concurrently
    async fn download_all(&self, ctx: &mut CrawlContext, urls: &[String], request: &CrawlRequest) {
        let mut fresh = Vec::with_capacity(urls.len());
        for url in urls {
            if ctx.claim_image(url) {
                fresh.push(url.as_str());
            }
        }

        let results: Vec<_> = stream::iter(fresh)
            .map(|url| async move {
                let result = self
                    .downloader
                    .fetch_and_maybe_save(url, &request.output_dir, request.min_size)
                    .await;
                (url, result)
            })
            .buffer_unordered(self.max_concurrent_downloads)
            .collect()
            .await;

        for (url, result) in results {
            ctx.record_download(url, result);
        }
    }
}

/// Applies scope, dedup and the direct-image shortcut to a page's links
fn discover_links(
    ctx: &mut CrawlContext,
    page: &RenderedPage,
    request: &CrawlRequest,
) -> DiscoveredLinks {
    let mut discovered = DiscoveredLinks::default();

    for href in &page.links {
        if !request.scope.contains(page.url.as_str(), href) {
            ctx.stats.links_out_of_scope += 1;
            continue;
        }

        if !ctx.visited.insert(href) {
            ctx.stats.links_already_visited += 1;
            continue;
        }

        if is_direct_image_link(href) {
            ctx.stats.direct_image_links += 1;
            discovered.images.push(href.clone());
            continue;
        }

        match Url::parse(href) {
            Ok(url) => discovered.pages.push(url),
            Err(e) => tracing::debug!("Dropping unparsable link {}: {}", href, e),
        }
    }

    discovered
}
