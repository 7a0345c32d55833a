//! Configuration module for Image Harvester
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use image_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, MinSize, OutputConfig, RendererConfig, RendererKind, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
