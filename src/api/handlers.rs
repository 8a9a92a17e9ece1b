use crate::api::AppState;
use crate::model::{parse_limit, parse_status_filter, ComplaintQuery};
use crate::RelayError;
use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct ComplaintsParams {
    pub limit: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Reclame-Relay API"
    }))
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Latest complaints for a company, optionally filtered by status
#[get("/api/complaints/{company_slug}")]
pub async fn get_company_complaints(
    path: web::Path<String>,
    params: web::Query<ComplaintsParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RelayError> {
    let slug = path.into_inner();
    let limit = parse_limit(params.limit.as_deref())?;
    let status = parse_status_filter(params.status.as_deref())?;
    let query = ComplaintQuery::new(&slug, limit, status)?;

    // Cancelled when the budget runs out, or when this handler finishes or is dropped
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    spawn_budget_timer(cancel.clone(), state.request_budget);

    match state.coordinator.get_complaints_until(&query, &cancel).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            tracing::error!("Complaints request for '{}' failed: {}", slug, e);
            Err(e)
        }
    }
}

/// Companies matching a name
#[get("/api/search")]
pub async fn search_companies(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RelayError> {
    let q = params.q.as_deref().unwrap_or_default();
    match state.resolver.search_companies(q).await {
        Ok(companies) => Ok(HttpResponse::Ok().json(companies)),
        Err(e) => {
            tracing::error!("Search for '{}' failed: {}", q, e);
            Err(e)
        }
    }
}

/// Cancels `token` after `budget` unless it is cancelled first
fn spawn_budget_timer(token: CancellationToken, budget: Duration) {
    actix_web::rt::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(budget) => {
                tracing::warn!("Request budget of {:?} spent, stopping pagination", budget);
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
}
