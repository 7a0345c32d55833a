//! Crawl statistics
//!
//! Every failure class the traversal tolerates (timeouts on non-root pages,
//! stale elements, failed fetches, failed writes) is counted here so that a
//! crawl never fails silently even though it keeps going.

use std::path::PathBuf;

/// Counters gathered during one crawl invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages successfully rendered
    pub pages_rendered: u64,

    /// Pages whose image elements never appeared in time
    pub render_timeouts: u64,

    /// Pages that failed to render for other reasons
    pub render_failures: u64,

    /// Elements that went stale while their attributes were read
    pub stale_elements: u64,

    /// Links rejected by the domain or base-URL scope
    pub links_out_of_scope: u64,

    /// Links skipped because they were already visited
    pub links_already_visited: u64,

    /// Links queued past the maximum depth and never rendered
    pub pages_beyond_depth: u64,

    /// Anchors pointing straight at an image file
    pub direct_image_links: u64,

    /// Image URLs skipped because this crawl already fetched them
    pub duplicate_images: u64,

    /// Images written to disk
    pub images_saved: u64,

    /// Images written under a random fallback name
    pub images_renamed: u64,

    /// Images rejected by the minimum size filter
    pub images_too_small: u64,

    /// Image requests that did not return a success status
    pub fetch_failures: u64,

    /// Images that could not be written even under a fallback name
    pub write_failures: u64,

    /// Paths of every file written, in completion order
    pub saved_files: Vec<PathBuf>,
}

impl CrawlStats {
    /// Adds another set of counters into this one
    pub fn merge(&mut self, other: &CrawlStats) {
        self.pages_rendered += other.pages_rendered;
        self.render_timeouts += other.render_timeouts;
        self.render_failures += other.render_failures;
        self.stale_elements += other.stale_elements;
        self.links_out_of_scope += other.links_out_of_scope;
        self.links_already_visited += other.links_already_visited;
        self.pages_beyond_depth += other.pages_beyond_depth;
        self.direct_image_links += other.direct_image_links;
        self.duplicate_images += other.duplicate_images;
        self.images_saved += other.images_saved;
        self.images_renamed += other.images_renamed;
        self.images_too_small += other.images_too_small;
        self.fetch_failures += other.fetch_failures;
        self.write_failures += other.write_failures;
        self.saved_files.extend(other.saved_files.iter().cloned());
    }

    /// Total number of tolerated failures
    pub fn failures(&self) -> u64 {
        self.render_timeouts + self.render_failures + self.fetch_failures + self.write_failures
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `label` - Heading, usually the start URL or "Total"
/// * `stats` - The statistics to display
pub fn print_statistics(label: &str, stats: &CrawlStats) {
    println!("=== Crawl Statistics: {} ===\n", label);

    println!("Pages:");
    println!("  Rendered: {}", stats.pages_rendered);
    println!("  Beyond max depth: {}", stats.pages_beyond_depth);
    println!();

    println!("Links:");
    println!("  Out of scope: {}", stats.links_out_of_scope);
    println!("  Already visited: {}", stats.links_already_visited);
    println!("  Direct image links: {}", stats.direct_image_links);
    println!();

    println!("Images:");
    println!(
        "  Saved: {} ({} under a fallback name)",
        stats.images_saved, stats.images_renamed
    );
    println!("  Below minimum size: {}", stats.images_too_small);
    println!("  Duplicate URLs skipped: {}", stats.duplicate_images);
    println!();

    if stats.failures() > 0 || stats.stale_elements > 0 {
        println!("Errors:");
        println!("  Render timeouts: {}", stats.render_timeouts);
        println!("  Render failures: {}", stats.render_failures);
        println!("  Stale elements: {}", stats.stale_elements);
        println!("  Fetch failures: {}", stats.fetch_failures);
        println!("  Write failures: {}", stats.write_failures);
        println!();
    }
}
