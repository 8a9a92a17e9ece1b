//! Configuration module for Reclame-Relay
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use reclame_relay::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("relay.toml")).unwrap();
//! println!("Scraping {}", config.upstream.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HeaderConfig, ServerConfig, UpstreamConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
