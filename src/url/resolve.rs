use crate::UrlError;
use url::Url;

/// Resolves an attribute value found on a page to an absolute URL
///
/// Returns None if the value should be ignored:
/// - empty or whitespace-only values
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links (same page anchors)
/// - values that do not resolve to an HTTP(S) URL
///
/// # Examples
///
/// ```
/// use image_harvester::url::resolve_link;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/gallery/index.html").unwrap();
/// let resolved = resolve_link("../img/cat.png", &page).unwrap();
/// assert_eq!(resolved.as_str(), "https://example.com/img/cat.png");
/// ```
pub fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match page_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Parses a start URL given on the command line
///
/// Start URLs must be absolute HTTP(S) URLs with a host.
pub fn parse_start_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(format!("{url_str}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(url)
}
