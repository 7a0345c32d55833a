//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! with the static renderer, writing into temporary output directories.

use image_harvester::config::{Config, MinSize, RendererKind};
use image_harvester::crawler::{crawl, CrawlRequest};
use image_harvester::download::{ImageDownloader, FALLBACK_NAME_LEN};
use image_harvester::render::RenderError;
use image_harvester::{CrawlError, HarvestError};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration that renders with plain HTTP
fn static_config() -> Config {
    let mut config = Config::default();
    config.renderer.kind = RendererKind::Static;
    config
}

/// Encodes a blank PNG of the given size
fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes
}

/// Mounts an HTML page at `route`
async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a PNG at `route` that must be fetched exactly `times` times
async fn mount_image(server: &MockServer, route: &str, bytes: Vec<u8>, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bytes)
                .insert_header("content-type", "image/png"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Lists file names in `dir`, sorted
fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_crawl_with_depth_limit() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/i.jpg"><a href="/p2">Next</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/p2",
        r#"<html><body><img src="/j.jpg"><a href="/p3">Deeper</a></body></html>"#,
    )
    .await;

    // Depth 2 is past the default maximum and must never be rendered
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<img src=\"/k.jpg\">"))
        .expect(0)
        .mount(&server)
        .await;

    mount_image(&server, "/i.jpg", png(10, 10), 1).await;
    mount_image(&server, "/j.jpg", png(10, 10), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_rendered, 2);
    assert_eq!(stats.pages_beyond_depth, 1);
    assert_eq!(stats.images_saved, 2);
    assert_eq!(files_in(out.path()), vec!["i.jpg", "j.jpg"]);
}

#[tokio::test]
async fn test_min_size_filter() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/small.png"><img src="/big.png"></body></html>"#,
    )
    .await;
    mount_image(&server, "/small.png", png(50, 50), 1).await;
    mount_image(&server, "/big.png", png(200, 120), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path())
        .unwrap()
        .with_min_size(Some(MinSize::new(100, 100)));
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.images_saved, 1);
    assert_eq!(stats.images_too_small, 1);
    assert_eq!(files_in(out.path()), vec!["big.png"]);
}

#[tokio::test]
async fn test_undecodable_image_depends_on_filter() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/broken.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not an image".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let start = format!("{}/", server.uri());

    // With a minimum size, an image of unknown size is rejected
    let filtered = TempDir::new().unwrap();
    let request = CrawlRequest::new(&start, filtered.path())
        .unwrap()
        .with_min_size(Some(MinSize::new(1, 1)));
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");
    assert_eq!(stats.images_too_small, 1);
    assert!(files_in(filtered.path()).is_empty());

    // Without one, the bytes are saved as-is
    let unfiltered = TempDir::new().unwrap();
    let request = CrawlRequest::new(&start, unfiltered.path()).unwrap();
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");
    assert_eq!(stats.images_saved, 1);
    assert_eq!(
        std::fs::read(unfiltered.path().join("broken.png")).unwrap(),
        b"not an image"
    );
}

#[tokio::test]
async fn test_same_basename_never_overwrites() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    std::fs::write(out.path().join("pic.png"), b"original").unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/a/pic.png"><img src="/b/pic.png"></body></html>"#,
    )
    .await;
    mount_image(&server, "/a/pic.png", png(4, 4), 1).await;
    mount_image(&server, "/b/pic.png", png(6, 6), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.images_saved, 2);
    assert_eq!(stats.images_renamed, 2);
    assert_eq!(std::fs::read(out.path().join("pic.png")).unwrap(), b"original");

    let renamed: Vec<String> = files_in(out.path())
        .into_iter()
        .filter(|name| name != "pic.png")
        .collect();
    assert_eq!(renamed.len(), 2);
    for name in renamed {
        assert_eq!(name.len(), FALLBACK_NAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_lowercase()));
    }
}

#[tokio::test]
async fn test_downloader_collision_uses_random_name() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_image(&server, "/one/logo.png", png(3, 3), 1).await;
    mount_image(&server, "/two/logo.png", png(5, 5), 1).await;

    let downloader = ImageDownloader::from_user_agent(&Config::default().user_agent).unwrap();
    let first = downloader
        .fetch_and_maybe_save(&format!("{}/one/logo.png", server.uri()), out.path(), None)
        .await
        .unwrap();
    let second = downloader
        .fetch_and_maybe_save(&format!("{}/two/logo.png", server.uri()), out.path(), None)
        .await
        .unwrap();

    let (first, second) = match (first, second) {
        (
            image_harvester::download::DownloadOutcome::Saved(a),
            image_harvester::download::DownloadOutcome::Saved(b),
        ) => (a, b),
        other => panic!("Expected two saved files, got {:?}", other),
    };
    assert_eq!(first.path, out.path().join("logo.png"));
    assert!(!first.fallback);
    assert!(second.fallback);
    assert_ne!(first.path, second.path);
    assert_eq!(files_in(out.path()).len(), 2);
}

#[tokio::test]
async fn test_direct_image_link_is_downloaded_not_rendered() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/thumb.png"><a href="/photo.png">Full size</a></body></html>"#,
    )
    .await;
    mount_image(&server, "/thumb.png", png(8, 8), 1).await;
    // One GET for the download; a render would add a second
    mount_image(&server, "/photo.png", png(64, 64), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path())
        .unwrap()
        .with_max_depth(3);
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_rendered, 1);
    assert_eq!(stats.direct_image_links, 1);
    assert_eq!(files_in(out.path()), vec!["photo.png", "thumb.png"]);
}

#[tokio::test]
async fn test_image_shared_between_pages_fetched_once() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/logo.png"><a href="/about">About</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><body><img src="/logo.png"></body></html>"#,
    )
    .await;
    mount_image(&server, "/logo.png", png(16, 16), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_rendered, 2);
    assert_eq!(stats.duplicate_images, 1);
    assert_eq!(files_in(out.path()), vec!["logo.png"]);
}

#[tokio::test]
async fn test_image_http_error_is_skipped() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><img src="/gone.png"><img src="/here.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_image(&server, "/here.png", png(2, 2), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.images_saved, 1);
    assert_eq!(files_in(out.path()), vec!["here.png"]);
}

#[tokio::test]
async fn test_start_page_without_images_fails() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/next">Next</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let result = crawl(&static_config(), &request, CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Crawl(CrawlError::RootRender {
            source: RenderError::Timeout { .. },
            ..
        }))
    ));
}

#[tokio::test]
async fn test_branch_without_images_is_contained() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <img src="/root.png">
            <a href="/empty">Empty</a>
            <a href="/full">Full</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/empty",
        r#"<html><body><p>No pictures here</p></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/full",
        r#"<html><body><img src="/leaf.png"></body></html>"#,
    )
    .await;
    mount_image(&server, "/root.png", png(2, 2), 1).await;
    mount_image(&server, "/leaf.png", png(2, 2), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_rendered, 2);
    assert_eq!(stats.render_timeouts, 1);
    assert_eq!(files_in(out.path()), vec!["leaf.png", "root.png"]);
}

#[tokio::test]
async fn test_base_url_limits_followed_links() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <img src="/root.png">
            <a href="/blog/post">Post</a>
            <a href="/shop/item">Item</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/blog/post",
        r#"<html><body><img src="/post.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shop/item"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_image(&server, "/root.png", png(2, 2), 1).await;
    mount_image(&server, "/post.png", png(2, 2), 1).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path())
        .unwrap()
        .with_base_url(format!("{}/blog", server.uri()));
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_rendered, 2);
    assert_eq!(stats.links_out_of_scope, 1);
}

#[tokio::test]
async fn test_cancelled_crawl_renders_nothing() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let result = crawl(&static_config(), &request, cancel).await;

    assert!(matches!(
        result,
        Err(HarvestError::Crawl(CrawlError::Cancelled(_)))
    ));
}

#[tokio::test]
async fn test_relative_urls_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/gallery"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/gallery/"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/gallery/",
        r#"<html><body><img src="cat.png"><a href="dog.png">Dog</a></body></html>"#,
    )
    .await;
    mount_image(&server, "/gallery/cat.png", png(4, 4), 1).await;
    mount_image(&server, "/gallery/dog.png", png(4, 4), 1).await;
    mount_image(&server, "/cat.png", png(4, 4), 0).await;
    mount_image(&server, "/dog.png", png(4, 4), 0).await;

    let request = CrawlRequest::new(&format!("{}/gallery", server.uri()), out.path())
        .unwrap()
        .with_max_depth(0);
    let stats = crawl(&static_config(), &request, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(stats.images_saved, 2);
    assert_eq!(stats.direct_image_links, 1);
    assert_eq!(files_in(out.path()), vec!["cat.png", "dog.png"]);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = static_config();
    config.crawler.max_concurrent_downloads = 0;

    let request = CrawlRequest::new(&format!("{}/", server.uri()), out.path()).unwrap();
    let result = crawl(&config, &request, CancellationToken::new()).await;

    assert!(matches!(result, Err(HarvestError::Config(_))));
}

#[test]
fn test_invalid_start_url_is_a_crawl_error() {
    let result = CrawlRequest::new("ftp://example.com/pics", ".");
    assert!(matches!(result, Err(CrawlError::InvalidStartUrl(_))));
}
