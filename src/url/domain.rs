use url::Url;

/// Extracts the network location (host and optional port) from a URL
///
/// The host is lowercased by URL parsing. The port is only included when the
/// URL spells one out that differs from the scheme default, so
/// `https://a.com:443/` and `https://a.com/` share a network location.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use image_harvester::url::network_location;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(network_location(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Returns true if both URLs share an identical network location
///
/// Unparsable URLs and URLs without a host are never the same domain as
/// anything.
///
/// # Examples
///
/// ```
/// use image_harvester::url::is_same_domain;
///
/// assert!(is_same_domain("https://a.com/x", "https://a.com/y"));
/// assert!(!is_same_domain("https://a.com/x", "https://b.com/y"));
/// assert!(!is_same_domain("https://a.com/x", "https://sub.a.com/y"));
/// ```
pub fn is_same_domain(first: &str, second: &str) -> bool {
    let (Ok(first), Ok(second)) = (Url::parse(first), Url::parse(second)) else {
        return false;
    };

    match (network_location(&first), network_location(&second)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
