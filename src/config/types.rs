use serde::Deserialize;

/// Main configuration structure for Reclame-Relay
///
/// Every section is optional; missing sections fall back to defaults that
/// point at the public site with a desktop browser header set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub headers: HeaderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream site and scraping limits
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UpstreamConfig {
    /// Root of the complaint-review site
    pub base_url: String,

    /// Total request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Maximum listing pages fetched per company
    pub max_pages: u32,

    /// Maximum companies returned by a search
    pub max_search_results: usize,

    /// Extra attempts for transient fetch failures (0 disables retrying)
    pub retries: u32,

    /// Delay between attempts, multiplied by the attempt number (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reclameaqui.com.br".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_pages: 50,
            max_search_results: 10,
            retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// Browser-like header set sent with every upstream request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HeaderConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_language: "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Wall-clock budget for one complaints request; pagination stops once spent
    pub request_budget_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_budget_secs: 120,
        }
    }
}
