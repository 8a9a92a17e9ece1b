use crate::config::types::{Config, HeaderConfig, ServerConfig, UpstreamConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use url::Url;

use crate::crawler::UPSTREAM_PAGE_CAP;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_upstream_config(&config.upstream)?;
    validate_header_config(&config.headers)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates upstream configuration
fn validate_upstream_config(config: &UpstreamConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url has no host: '{}'",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got timeout={}s connect={}s",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if config.max_pages < 1 || config.max_pages > UPSTREAM_PAGE_CAP {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            UPSTREAM_PAGE_CAP, config.max_pages
        )));
    }

    if config.max_search_results < 1 || config.max_search_results > 50 {
        return Err(ConfigError::Validation(format!(
            "max_search_results must be between 1 and 50, got {}",
            config.max_search_results
        )));
    }

    if config.retries > 5 {
        return Err(ConfigError::Validation(format!(
            "retries must be <= 5, got {}",
            config.retries
        )));
    }

    Ok(())
}

/// Validates the browser header set
fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("user_agent", &config.user_agent),
        ("accept", &config.accept),
        ("accept_language", &config.accept_language),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }

        if HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is not a valid header value: '{}'",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("port cannot be 0".to_string()));
    }

    if config.request_budget_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_budget_secs must be >= 1, got {}",
            config.request_budget_secs
        )));
    }

    Ok(())
}
