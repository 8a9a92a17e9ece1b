//! Domain model
//!
//! All values are built fresh per request and never mutated after extraction.

mod company;
mod complaint;
mod query;

pub use company::{Company, CompanySummary};
pub use complaint::{ChatMessage, Complaint, FinalConsideration, Status};
pub use query::{
    parse_limit, parse_status_filter, validate_search_query, ComplaintQuery, ComplaintQueryResult,
    DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, MIN_QUERY_LEN,
};
