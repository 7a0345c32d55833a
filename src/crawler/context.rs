//! Per-invocation traversal state

use crate::download::{DownloadError, DownloadOutcome};
use crate::output::CrawlStats;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of URLs seen during one crawl invocation
///
/// `insert` is the only way to test membership while traversing: checking
/// and inserting happen under one lock, so two observers of the same URL can
/// never both treat it as new.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url`, returning true if it was not present before
    pub fn insert(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(PoisonError::into_inner);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    #[cfg(test)]
    fn contains(&self, url: &str) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// State owned by one crawl invocation
#[derive(Debug, Default)]
pub struct CrawlContext {
    /// Page and link URLs already claimed by the traversal
    pub visited: VisitedSet,

    /// Image URLs already handed to the downloader
    pub fetched_images: VisitedSet,

    pub stats: CrawlStats,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims an image URL for download, counting repeats
    pub fn claim_image(&mut self, url: &str) -> bool {
        if self.fetched_images.insert(url) {
            true
        } else {
            self.stats.duplicate_images += 1;
            false
        }
    }

    /// Folds one download result into the statistics
    pub fn record_download(&mut self, url: &str, result: Result<DownloadOutcome, DownloadError>) {
        match result {
            Ok(DownloadOutcome::Saved(saved)) => {
                self.stats.images_saved += 1;
                if saved.fallback {
                    self.stats.images_renamed += 1;
                }
                self.stats.saved_files.push(saved.path);
            }
            Ok(DownloadOutcome::TooSmall { .. }) => {
                self.stats.images_too_small += 1;
            }
            Ok(DownloadOutcome::FetchFailed { reason, .. }) => {
                tracing::debug!("Skipped image {}: {}", url, reason);
                self.stats.fetch_failures += 1;
            }
            Err(e) => {
                tracing::warn!("Could not save image {}: {}", url, e);
                self.stats.write_failures += 1;
            }
        }
    }
}
