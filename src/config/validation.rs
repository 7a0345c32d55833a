use crate::config::types::{Config, CrawlerConfig, OutputConfig, RendererConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_concurrent_downloads < 1 || config.max_concurrent_downloads > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_downloads must be between 1 and 64, got {}",
            config.max_concurrent_downloads
        )));
    }

    // The base URL is a plain prefix, but a prefix that is not itself a URL
    // can never match a resolved link.
    if !config.base_url.is_empty() {
        let url = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "base_url '{}' must use HTTP or HTTPS",
                config.base_url
            )));
        }
    }

    if config.crawl_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "crawl_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.wait_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "wait_timeout_secs must be >= 1, got {}",
            config.wait_timeout_secs
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be positive, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "user agent name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    Ok(())
}
