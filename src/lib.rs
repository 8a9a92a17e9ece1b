//! Reclame-Relay: complaint listings republished as JSON
//!
//! This crate scrapes public complaint listings and company search results
//! from a complaint-review site, decodes the structured payload the site embeds
//! in its pages, and serves the result over a small HTTP API.

pub mod api;
pub mod config;
pub mod crawler;
pub mod model;

#[cfg(test)]
mod test_support;

use thiserror::Error;

/// Main error type for Reclame-Relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Company not found: {slug}")]
    CompanyNotFound { slug: String },

    #[error("Upstream error: {0}")]
    Upstream(#[from] FetchError),

    #[error("Upstream format error: {0}")]
    Format(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Builds an input error naming the offending field
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        RelayError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single failed upstream request
///
/// Always the result of exactly one attempt; retrying is the caller's call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Upstream returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    /// True when the upstream status looks like it is refusing us
    /// (forbidden, rate limited, or temporarily unavailable)
    pub fn is_blocking(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status, .. } if matches!(status, 403 | 429 | 503))
    }

    /// True for an upstream 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::HttpStatus { status: 404, .. })
    }

    /// The upstream HTTP status, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            FetchError::Transport { .. } => None,
        }
    }
}

/// The upstream page could not be decoded into domain records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot read '{field}': {reason}")]
pub struct ParseError {
    pub field: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Reclame-Relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CompanyResolver, Coordinator, HttpFetcher, PageFetcher};
pub use model::{Company, CompanySummary, Complaint, ComplaintQuery, ComplaintQueryResult, Status};
