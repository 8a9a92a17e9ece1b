//! HTTP fetcher implementation
//!
//! This module handles all upstream requests, including:
//! - Building HTTP clients that carry a browser-like header set
//! - Single-attempt GET requests with error classification
//! - An opt-in retry wrapper for transient failures

use crate::config::{HeaderConfig, UpstreamConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Source of raw upstream pages
///
/// One call is one attempt. Implementations must not retry on their own;
/// wrap them in [`RetryingFetcher`] when resilience is wanted.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with the configured headers and timeouts
///
/// # Arguments
///
/// * `upstream` - Timeouts for the upstream site
/// * `headers` - Header set sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    upstream: &UpstreamConfig,
    headers: &HeaderConfig,
) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();

    // Values were checked during config validation; skip any that still fail
    if let Ok(value) = HeaderValue::from_str(&headers.accept) {
        default_headers.insert(ACCEPT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&headers.accept_language) {
        default_headers.insert(ACCEPT_LANGUAGE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&headers.user_agent) {
        default_headers.insert(USER_AGENT, value);
    }

    Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(upstream.timeout_secs))
        .connect_timeout(Duration::from_secs(upstream.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(
        upstream: &UpstreamConfig,
        headers: &HeaderConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(upstream, headers)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL with a single attempt
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 2xx | body text |
    /// | Any other status | `HttpStatus` with the code |
    /// | Timeout | `Transport` |
    /// | Connection refused | `Transport` |
    /// | Body read failure | `Transport` |
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("GET {} -> HTTP {}", url, status.as_u16());
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, &e))
    }
}

/// Turns a reqwest failure into a transport error with a readable message
fn classify_transport_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

/// Retry policy wrapped around another fetcher
///
/// Retries transport failures and 5xx statuses that do not look like
/// blocking. 404 and 4xx are returned immediately. The delay before attempt
/// `n` is `backoff * n`.
pub struct RetryingFetcher<F> {
    inner: F,
    retries: u32,
    backoff: Duration,
}

impl<F: PageFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            retries,
            backoff,
        }
    }
}

/// Whether a failed attempt is worth repeating
fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Transport { .. } => true,
        FetchError::HttpStatus { status, .. } => *status >= 500 && !error.is_blocking(),
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retries && is_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Builds the fetcher stack described by the configuration
pub fn build_fetcher(
    upstream: &UpstreamConfig,
    headers: &HeaderConfig,
) -> Result<Arc<dyn PageFetcher>, reqwest::Error> {
    let http = HttpFetcher::from_config(upstream, headers)?;

    if upstream.retries == 0 {
        return Ok(Arc::new(http));
    }

    Ok(Arc::new(RetryingFetcher::new(
        http,
        upstream.retries,
        Duration::from_millis(upstream.retry_backoff_ms),
    )))
}
