use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Main configuration structure for Image Harvester
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below. Command-line flags are applied on top.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth to follow from the start page (inclusive)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Only follow links starting with this prefix (empty = no restriction)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of image downloads in flight for one page
    #[serde(rename = "max-concurrent-downloads")]
    pub max_concurrent_downloads: usize,

    /// Wall-clock bound for a single crawl invocation
    #[serde(rename = "crawl-timeout-secs")]
    pub crawl_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            base_url: String::new(),
            max_concurrent_downloads: 4,
            crawl_timeout_secs: None,
        }
    }
}

/// Which page renderer to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium over the DevTools protocol
    Chromium,
    /// Plain HTTP GET plus HTML parsing, no JavaScript
    Static,
}

impl FromStr for RendererKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "static" => Ok(Self::Static),
            other => Err(ConfigError::Validation(format!(
                "unknown renderer '{}', expected 'chromium' or 'static'",
                other
            ))),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// Page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub kind: RendererKind,

    /// Run the browser without a window
    pub headless: bool,

    #[serde(rename = "window-width")]
    pub window_width: u32,

    #[serde(rename = "window-height")]
    pub window_height: u32,

    /// How long to wait for image elements to appear on a page
    #[serde(rename = "wait-timeout-secs")]
    pub wait_timeout_secs: u64,

    /// Delay between two readiness probes
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::Chromium,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            wait_timeout_secs: 10,
            poll_interval_ms: 100,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving downloaded images
    pub directory: String,

    /// Minimum image size, e.g. "640x480"
    #[serde(rename = "min-size")]
    pub min_size: Option<MinSize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            min_size: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// Minimum pixel dimensions an image must reach to be saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct MinSize {
    pub width: u32,
    pub height: u32,
}

impl MinSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if an image of the given dimensions is large enough
    pub fn admits(&self, width: u32, height: u32) -> bool {
        width >= self.width && height >= self.height
    }
}

impl FromStr for MinSize {
    type Err = ConfigError;

    /// Parses `WIDTHxHEIGHT`, e.g. `640x480`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSize(s.to_string());

        let (width, height) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = width.parse().map_err(|_| invalid())?;
        let height: u32 = height.parse().map_err(|_| invalid())?;

        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

impl TryFrom<String> for MinSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MinSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
