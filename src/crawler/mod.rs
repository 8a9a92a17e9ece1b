//! Crawler module for upstream page fetching and extraction
//!
//! This module contains the scraping core, including:
//! - HTTP fetching with browser-like headers
//! - Upstream URL construction
//! - Decoding the payload embedded in upstream pages
//! - Paginated complaint extraction
//! - Company search

mod coordinator;
mod fetcher;
mod parser;
mod resolver;
mod url_builder;

pub use coordinator::{Coordinator, StopReason, UPSTREAM_PAGE_CAP};
pub use fetcher::{
    build_fetcher, build_http_client, HttpFetcher, PageFetcher, RetryingFetcher,
};
pub use parser::{
    map_status, parse_company_page, parse_listing_page, parse_search_results, ListingContext,
};
pub use resolver::CompanyResolver;
pub use url_builder::UrlBuilder;
