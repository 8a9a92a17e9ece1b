//! Mapping of relay errors onto HTTP responses

use crate::RelayError;
use actix_web::error::QueryPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: Option<String>,
    pub status_code: u16,
}

impl RelayError {
    /// Short machine-readable label for the error body
    fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidInput { .. } => "invalid_input",
            RelayError::CompanyNotFound { .. } => "company_not_found",
            RelayError::Upstream(e) if e.is_blocking() => "upstream_blocked",
            RelayError::Upstream(_) => "upstream_unavailable",
            RelayError::Format(_) => "upstream_format",
            RelayError::Config(_) | RelayError::Http(_) | RelayError::Io(_) => "internal",
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::CompanyNotFound { .. } => StatusCode::NOT_FOUND,
            RelayError::Upstream(e) if e.is_blocking() => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Upstream(_) | RelayError::Format(_) => StatusCode::BAD_GATEWAY,
            RelayError::Config(_) | RelayError::Http(_) | RelayError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            detail: Some(self.to_string()),
            status_code: status.as_u16(),
        })
    }
}

/// Turns query-string decoding failures (e.g. `limit=abc`) into 422s
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected query '{}': {}", req.query_string(), err);
    RelayError::invalid_input("query", err.to_string()).into()
}
