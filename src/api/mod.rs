//! HTTP API
//!
//! Thin actix-web layer over the crawler: it validates query parameters,
//! calls the coordinator or resolver, and maps [`crate::RelayError`] onto
//! status codes.

mod error;
mod handlers;

pub use error::{query_error_handler, ErrorResponse};
pub use handlers::{ComplaintsParams, SearchParams};

use crate::config::Config;
use crate::crawler::{CompanyResolver, Coordinator, PageFetcher};
use crate::ConfigError;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;

/// Shared, read-only request state
pub struct AppState {
    pub coordinator: Coordinator,
    pub resolver: CompanyResolver,
    pub request_budget: Duration,
}

impl AppState {
    /// Builds the state from configuration over the given fetcher
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            coordinator: Coordinator::from_config(fetcher.clone(), &config.upstream)?,
            resolver: CompanyResolver::from_config(fetcher, &config.upstream)?,
            request_budget: Duration::from_secs(config.server.request_budget_secs),
        })
    }
}

/// Registers the API routes and extractor settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(handlers::root)
        .service(handlers::health_check)
        .service(handlers::get_company_complaints)
        .service(handlers::search_companies);
}

/// Runs the HTTP server until shutdown
pub async fn run_server(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(state);

    tracing::info!("Starting Web Server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
