use crate::config::MinSize;
use crate::url::{parse_start_url, CrawlScope};
use crate::CrawlError;
use std::path::PathBuf;
use url::Url;

/// Everything one crawl invocation needs to know
///
/// A request is built once per start page and never changes while the crawl
/// runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// The page rendered at depth 0
    pub start_url: Url,

    /// Existing directory receiving images
    pub output_dir: PathBuf,

    /// Optional minimum image dimensions
    pub min_size: Option<MinSize>,

    /// Which discovered links may be followed
    pub scope: CrawlScope,

    /// Deepest link depth that is still rendered (the start page is 0)
    pub max_depth: u32,
}

impl CrawlRequest {
    /// Creates a request with no size filter, no base URL, and depth 1
    pub fn new(start_url: &str, output_dir: impl Into<PathBuf>) -> Result<Self, CrawlError> {
        Ok(Self {
            start_url: parse_start_url(start_url)?,
            output_dir: output_dir.into(),
            min_size: None,
            scope: CrawlScope::default(),
            max_depth: 1,
        })
    }

    pub fn with_min_size(mut self, min_size: Option<MinSize>) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.scope = CrawlScope::new(base_url);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}
