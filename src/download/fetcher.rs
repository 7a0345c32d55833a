//! HTTP fetcher for image bytes
//!
//! This module handles all direct HTTP requests the crawler makes outside of
//! the page renderer:
//! - Building the HTTP client with the user agent string
//! - GET requests for image URLs
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the body
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, truncated body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (image hosts commonly redirect to a CDN) and
/// plain HTTP is allowed. No cookies or custom headers are sent beyond the
/// user agent.
///
/// # Example
///
/// ```no_run
/// use image_harvester::config::UserAgentConfig;
/// use image_harvester::download::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its full body
///
/// There is no retry: a failed image is skipped by the caller.
pub async fn fetch_bytes(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
