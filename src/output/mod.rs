//! Output module for reporting crawl results
//!
//! Downloaded images are the primary output and are written by the
//! `download` module; this module summarizes what a crawl did.

mod stats;

pub use stats::{print_statistics, CrawlStats};
