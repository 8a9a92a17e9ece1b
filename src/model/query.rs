//! Validated request inputs and the complaints response envelope

use crate::model::{Company, Complaint, Status};
use crate::{RelayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest accepted `limit`
pub const MIN_LIMIT: i64 = 1;

/// Largest accepted `limit`
pub const MAX_LIMIT: i64 = 100;

/// `limit` used when the caller does not give one
pub const DEFAULT_LIMIT: i64 = 10;

/// Minimum search term length, in characters
pub const MIN_QUERY_LEN: usize = 2;

/// A complaints request that passed input validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintQuery {
    company_slug: String,
    limit: usize,
    status: Option<Status>,
}

impl ComplaintQuery {
    /// Validates caller input before any upstream request is made
    ///
    /// # Errors
    ///
    /// * `RelayError::InvalidInput` naming `company_slug` or `limit`
    pub fn new(company_slug: &str, limit: i64, status: Option<Status>) -> Result<Self> {
        let company_slug = company_slug.trim();

        if company_slug.is_empty() {
            return Err(RelayError::invalid_input(
                "company_slug",
                "must not be empty",
            ));
        }

        if !company_slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(RelayError::invalid_input(
                "company_slug",
                format!("contains characters not allowed in a slug: '{}'", company_slug),
            ));
        }

        // `.` and `..` are path navigation, not slugs
        if company_slug.chars().all(|c| c == '.') {
            return Err(RelayError::invalid_input(
                "company_slug",
                format!("'{}' is not a company slug", company_slug),
            ));
        }

        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(RelayError::invalid_input(
                "limit",
                format!("must be between {} and {}, got {}", MIN_LIMIT, MAX_LIMIT, limit),
            ));
        }

        Ok(Self {
            company_slug: company_slug.to_string(),
            limit: limit as usize,
            status,
        })
    }

    pub fn company_slug(&self) -> &str {
        &self.company_slug
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }
}

/// Parses the optional `limit` parameter, falling back to [`DEFAULT_LIMIT`]
///
/// Only the integer syntax is checked here; the range is checked by
/// [`ComplaintQuery::new`].
pub fn parse_limit(raw: Option<&str>) -> Result<i64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_LIMIT),
        Some(value) => value.parse::<i64>().map_err(|_| {
            RelayError::invalid_input("limit", format!("must be an integer, got '{}'", value))
        }),
    }
}

/// Parses the optional `status` filter parameter
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<Status>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(code) => code
            .parse::<Status>()
            .map(Some)
            .map_err(|reason| RelayError::invalid_input("status", reason)),
    }
}

/// Validates a search term, returning it trimmed
pub fn validate_search_query(query: &str) -> Result<&str> {
    let query = query.trim();
    let len = query.chars().count();

    if len < MIN_QUERY_LEN {
        return Err(RelayError::invalid_input(
            "q",
            format!("must be at least {} characters, got {}", MIN_QUERY_LEN, len),
        ));
    }

    Ok(query)
}

/// Response envelope for a complaints request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintQueryResult {
    pub company: Company,
    pub complaints: Vec<Complaint>,
    /// Always `complaints.len()`
    pub total_returned: usize,
    /// When extraction finished
    pub scraped_at: DateTime<Utc>,
}

impl ComplaintQueryResult {
    /// Builds the envelope, stamping the completion time
    pub fn new(company: Company, complaints: Vec<Complaint>) -> Self {
        Self {
            company,
            total_returned: complaints.len(),
            complaints,
            scraped_at: Utc::now(),
        }
    }
}
