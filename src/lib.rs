//! Image Harvester: a depth-bounded same-site image crawler
//!
//! This crate renders a start page, follows same-site links up to a maximum
//! depth, and downloads every discovered image (optionally filtered by pixel
//! dimensions) into a local output directory.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod render;
pub mod url;

use thiserror::Error;

/// Main error type for Image Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid size '{0}': expected WIDTHxHEIGHT with positive integers")]
    InvalidSize(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Errors that abort a whole crawl invocation
///
/// Everything scoped to a single link, image or non-root page is contained
/// inside the traversal and only shows up in the crawl statistics.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid start URL: {0}")]
    InvalidStartUrl(#[from] UrlError),

    #[error("Start page {url} could not be rendered: {source}")]
    RootRender {
        url: String,
        source: render::RenderError,
    },

    #[error("Output directory {0} does not exist")]
    MissingOutputDir(String),

    #[error("Crawl of {0} was cancelled before the start page was rendered")]
    Cancelled(String),
}

/// Result type alias for Image Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::{Config, MinSize};
pub use crawler::{CrawlRequest, Crawler};
pub use output::CrawlStats;
pub use crate::url::{is_direct_image_link, is_same_domain, CrawlScope};
