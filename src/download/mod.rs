//! Image fetch and filter
//!
//! This module turns an image URL into a file on disk:
//! - GET the bytes (non-success statuses are skipped, never retried)
//! - Measure the image to apply the minimum size filter
//! - Write the bytes under a collision-safe file name

mod fetcher;
mod filter;
mod writer;

pub use fetcher::{build_http_client, fetch_bytes, FetchResult};
pub use filter::{accepts, decode_dimensions};
pub use writer::{preferred_filename, random_filename, save_image, SavedFile, FALLBACK_NAME_LEN};

use crate::config::{MinSize, UserAgentConfig};
use reqwest::Client;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that make a single image fail
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What happened to one image URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The image was written to disk
    Saved(SavedFile),

    /// The image was smaller than the minimum size, or its size is unknown
    /// while a minimum size is set
    TooSmall { size: Option<(u32, u32)> },

    /// The request failed or returned a non-success status
    FetchFailed {
        status: Option<u16>,
        reason: String,
    },
}

/// Downloads images with a shared HTTP client
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a downloader with its own HTTP client
    pub fn from_user_agent(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetches an image and saves it if it passes the size filter
    ///
    /// # Arguments
    ///
    /// * `image_url` - Absolute URL of the image
    /// * `output_dir` - Existing directory receiving the file
    /// * `min_size` - Optional minimum dimensions
    ///
    /// # Returns
    ///
    /// * `Ok(DownloadOutcome)` - Saved, filtered out, or fetch failed
    /// * `Err(DownloadError)` - Neither the preferred nor a fallback file
    ///   could be written
    pub async fn fetch_and_maybe_save(
        &self,
        image_url: &str,
        output_dir: &Path,
        min_size: Option<MinSize>,
    ) -> Result<DownloadOutcome, DownloadError> {
        let body = match fetch_bytes(&self.client, image_url).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                tracing::debug!(
                    "Fetched {} (HTTP {}, {} bytes, content-type '{}') from {}",
                    image_url,
                    status_code,
                    body.len(),
                    content_type,
                    final_url
                );
                body
            }
            FetchResult::HttpError { status_code } => {
                tracing::debug!("Image {} returned HTTP {}", image_url, status_code);
                return Ok(DownloadOutcome::FetchFailed {
                    status: Some(status_code),
                    reason: format!("HTTP {}", status_code),
                });
            }
            FetchResult::NetworkError { error } => {
                tracing::debug!("Image {} could not be fetched: {}", image_url, error);
                return Ok(DownloadOutcome::FetchFailed {
                    status: None,
                    reason: error,
                });
            }
        };

        let size = decode_dimensions(&body);
        if !accepts(min_size, size) {
            tracing::debug!("Skipping {} (size {:?} below {:?})", image_url, size, min_size);
            return Ok(DownloadOutcome::TooSmall { size });
        }

        let saved = save_image(output_dir, image_url, &body).await?;
        tracing::info!("Saved {} -> {}", image_url, saved.path.display());

        Ok(DownloadOutcome::Saved(saved))
    }
}
