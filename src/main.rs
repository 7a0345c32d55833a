//! Image Harvester main entry point
//!
//! This is the command-line interface for the Image Harvester crawler.

use anyhow::Context;
use clap::Parser;
use image_harvester::config::{load_config, validate, Config, MinSize, RendererKind};
use image_harvester::crawler::{crawl, CrawlRequest};
use image_harvester::output::{print_statistics, CrawlStats};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Image Harvester: download images from web pages
///
/// Renders each PAGE, downloads its images, and follows links on the same
/// host up to --maxDepth, downloading images found along the way.
#[derive(Parser, Debug)]
#[command(name = "image-harvester")]
#[command(version)]
#[command(about = "Download images from web pages and their same-site links", long_about = None)]
struct Cli {
    /// Web pages to download images from
    #[arg(value_name = "PAGE", required = true)]
    pages: Vec<String>,

    /// Output folder (created if missing)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Minimum size of images to download
    #[arg(long = "minSize", alias = "min-size", value_name = "WIDTHxHEIGHT")]
    min_size: Option<MinSize>,

    /// Maximum depth of links to follow
    #[arg(long = "maxDepth", alias = "max-depth", value_name = "N")]
    max_depth: Option<u32>,

    /// Only follow links starting with this prefix
    #[arg(long = "baseUrl", alias = "base-url", value_name = "PREFIX")]
    base_url: Option<String>,

    /// Page renderer: chromium or static
    #[arg(long, value_name = "KIND")]
    renderer: Option<RendererKind>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headful: bool,

    /// Stop each crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let output_dir = PathBuf::from(&config.output.directory);
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let shutdown = CancellationToken::new();
    spawn_ctrl_c_handler(shutdown.clone());

    handle_crawl(&cli.pages, &config, &output_dir, &shutdown).await;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("image_harvester=info,warn"),
            1 => EnvFilter::new("image_harvester=debug,info"),
            2 => EnvFilter::new("image_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }
    if let Some(min_size) = cli.min_size {
        config.output.min_size = Some(min_size);
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(base_url) = &cli.base_url {
        config.crawler.base_url = base_url.clone();
    }
    if let Some(renderer) = cli.renderer {
        config.renderer.kind = renderer;
    }
    if cli.headful {
        config.renderer.headless = false;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.crawl_timeout_secs = Some(timeout);
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Cancels every crawl on the first Ctrl-C
fn spawn_ctrl_c_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current page");
            shutdown.cancel();
        }
    });
}

/// Crawls every start page in turn
///
/// A failure on one start page is logged and the next page is crawled.
async fn handle_crawl(
    pages: &[String],
    config: &Config,
    output_dir: &std::path::Path,
    shutdown: &CancellationToken,
) {
    let mut total = CrawlStats::default();

    tracing::info!(
        "Renderer: {}, output: {}, min size: {}",
        config.renderer.kind,
        output_dir.display(),
        config
            .output
            .min_size
            .map(|size| size.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    for page in pages {
        if shutdown.is_cancelled() {
            break;
        }

        let request = match CrawlRequest::new(page, output_dir) {
            Ok(request) => request
                .with_min_size(config.output.min_size)
                .with_base_url(config.crawler.base_url.clone())
                .with_max_depth(config.crawler.max_depth),
            Err(e) => {
                tracing::error!("Skipping {}: {}", page, e);
                continue;
            }
        };

        let cancel = shutdown.child_token();
        if let Some(secs) = config.crawler.crawl_timeout_secs {
            let deadline = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                deadline.cancel();
            });
        }

        match crawl(config, &request, cancel).await {
            Ok(stats) => {
                print_statistics(page, &stats);
                total.merge(&stats);
            }
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", page, e);
            }
        }
    }

    if pages.len() > 1 {
        print_statistics("Total", &total);
    }
}
