//! URL handling module for Image Harvester
//!
//! This module provides network-location extraction, the same-domain and
//! base-URL scope tests, direct-image-link detection, and resolution of
//! attribute values found on rendered pages.

mod domain;
mod resolve;
mod scope;

// Re-export main functions
pub use domain::{is_same_domain, network_location};
pub use resolve::{parse_start_url, resolve_link};
pub use scope::{is_direct_image_link, CrawlScope};
