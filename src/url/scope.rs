use super::domain::is_same_domain;

/// File suffixes that mark an anchor as a direct link to an image
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Decides which discovered links a crawl is allowed to follow
///
/// A link is in scope when it shares the network location of the page it was
/// found on and, if a base URL is configured, starts with that prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlScope {
    base_url: String,
}

impl CrawlScope {
    /// Creates a scope restricted to links starting with `base_url`
    ///
    /// An empty base URL leaves the scope unrestricted within the page's
    /// network location.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Returns the configured base URL prefix (possibly empty)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if `href`, found on `page_url`, should be followed
    ///
    /// # Examples
    ///
    /// ```
    /// use image_harvester::url::CrawlScope;
    ///
    /// let scope = CrawlScope::new("https://a.com/blog");
    /// assert!(scope.contains("https://a.com/", "https://a.com/blog/post"));
    /// assert!(!scope.contains("https://a.com/", "https://a.com/shop/item"));
    /// assert!(!scope.contains("https://a.com/", "https://b.com/blog/post"));
    /// ```
    pub fn contains(&self, page_url: &str, href: &str) -> bool {
        is_same_domain(page_url, href)
            && (self.base_url.is_empty() || href.starts_with(&self.base_url))
    }
}

/// Returns true if the URL names an image file by its suffix
///
/// The match is case-sensitive and applies to the whole string, so a query
/// string after the extension disqualifies the link.
///
/// # Examples
///
/// ```
/// use image_harvester::url::is_direct_image_link;
///
/// assert!(is_direct_image_link("https://a.com/photo.png"));
/// assert!(!is_direct_image_link("https://a.com/photo.PNG"));
/// assert!(!is_direct_image_link("https://a.com/photo.png?w=100"));
/// ```
pub fn is_direct_image_link(href: &str) -> bool {
    IMAGE_SUFFIXES.iter().any(|suffix| href.ends_with(suffix))
}
