//! Static HTML renderer
//!
//! Fetches the page with a plain GET and parses the markup. No script runs,
//! so the document cannot change after it is parsed: the image-element
//! readiness check is evaluated exactly once.

use super::{PageRenderer, RenderError, RenderedPage};
use crate::url::resolve_link;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Renderer that reads server-sent HTML only
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    client: Client,
}

impl StaticRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError> {
        let navigation_error = |message: String| RenderError::Navigation {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(navigation_error(format!("HTTP {}", status.as_u16())));
        }

        // Relative values resolve against the document, which may sit
        // behind a redirect
        let document_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        let (mut page, image_elements) = parse_page(&body, &document_url);
        page.url = url.clone();
        if image_elements == 0 {
            return Err(RenderError::Timeout {
                url: url.to_string(),
                waited: Duration::ZERO,
            });
        }

        Ok(page)
    }
}

/// Parses HTML and extracts image sources and anchor targets
///
/// `page_url` is the URL the document was served from; relative values are
/// resolved against it.
///
/// # Extraction Rules
///
/// - `<img src="...">` values become image candidates; `<img>` elements
///   without `src` still count as image elements for readiness
/// - `<a href="...">` values become link candidates
/// - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only values
///   are ignored
///
/// # Returns
///
/// The rendered page and the number of `<img>` elements in the document.
///
/// # Example
///
/// ```
/// use image_harvester::render::parse_page;
/// use url::Url;
///
/// let html = r#"<html><body><img src="/i.jpg"><a href="/p2">Next</a></body></html>"#;
/// let base = Url::parse("https://ex.com/").unwrap();
/// let (page, image_elements) = parse_page(html, &base);
/// assert_eq!(image_elements, 1);
/// assert_eq!(page.images, vec!["https://ex.com/i.jpg".to_string()]);
/// assert_eq!(page.links, vec!["https://ex.com/p2".to_string()]);
/// ```
pub fn parse_page(html: &str, page_url: &Url) -> (RenderedPage, usize) {
    let document = Html::parse_document(html);
    let mut page = RenderedPage::new(page_url.clone());
    let mut image_elements = 0;

    if let Ok(img_selector) = Selector::parse("img") {
        for element in document.select(&img_selector) {
            image_elements += 1;
            if let Some(src) = element.value().attr("src") {
                if let Some(absolute_url) = resolve_link(src, page_url) {
                    page.images.push(absolute_url.to_string());
                }
            }
        }
    }

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, page_url) {
                    page.links.push(absolute_url.to_string());
                }
            }
        }
    }

    (page, image_elements)
}
