//! Reclame-Relay main entry point
//!
//! Command-line interface that loads configuration and serves the HTTP API.

use anyhow::Context;
use clap::Parser;
use reclame_relay::api::{run_server, AppState};
use reclame_relay::config::{load_config_with_hash, validate, Config};
use reclame_relay::crawler::build_fetcher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reclame-Relay: complaint listings republished as JSON
///
/// Scrapes public complaints and company search results from the upstream
/// complaint-review site and serves them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "reclame-relay")]
#[command(version)]
#[command(about = "Complaint listings republished as JSON", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(long, env = "API_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(long, env = "API_PORT")]
    port: Option<u16>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration, print it, and exit
    #[arg(long)]
    check_config: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    validate(&config).context("invalid configuration")?;

    if cli.check_config {
        print_config(&config);
        return Ok(());
    }

    let fetcher = build_fetcher(&config.upstream, &config.headers)
        .context("failed to build HTTP client")?;
    let state = AppState::new(fetcher, &config)?;

    tracing::info!(
        "Upstream: {} (max {} pages, {} retries)",
        config.upstream.base_url,
        config.upstream.max_pages,
        config.upstream.retries
    );

    run_server(state, &config.server.host, config.server.port).await?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reclame_relay=info,warn"),
            1 => EnvFilter::new("reclame_relay=debug,info"),
            2 => EnvFilter::new("reclame_relay=trace,debug"),
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

/// Handles --check-config: shows the effective configuration
fn print_config(config: &Config) {
    println!("=== Reclame-Relay Configuration ===\n");

    println!("Upstream:");
    println!("  Base URL: {}", config.upstream.base_url);
    println!(
        "  Timeouts: {}s total, {}s connect",
        config.upstream.timeout_secs, config.upstream.connect_timeout_secs
    );
    println!("  Max pages: {}", config.upstream.max_pages);
    println!("  Max search results: {}", config.upstream.max_search_results);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.upstream.retries, config.upstream.retry_backoff_ms
    );

    println!("\nHeaders:");
    println!("  User-Agent: {}", config.headers.user_agent);
    println!("  Accept: {}", config.headers.accept);
    println!("  Accept-Language: {}", config.headers.accept_language);

    println!("\nServer:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Request budget: {}s", config.server.request_budget_secs);

    println!("\n✓ Configuration is valid");
}
