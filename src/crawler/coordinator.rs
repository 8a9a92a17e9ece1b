//! Complaint extraction coordinator
//!
//! Resolves a company, then walks its complaint listing one page at a time:
//! - Fetching strictly in page order, one request in flight
//! - Filtering by status and dropping repeated ids
//! - Stopping at the limit, the page cap, an empty page, or a failed page
//!
//! A failure on the profile page or on listing page 1 is returned as an error.
//! A failure on any later page ends pagination and the complaints gathered so
//! far are returned as a normal result.

use crate::config::UpstreamConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{parse_company_page, parse_listing_page, ListingContext};
use crate::crawler::url_builder::UrlBuilder;
use crate::model::{Company, Complaint, ComplaintQuery, ComplaintQueryResult};
use crate::{ConfigError, RelayError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Hard ceiling on listing pages the upstream site will serve
pub const UPSTREAM_PAGE_CAP: u32 = 50;

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enough matching complaints were collected
    LimitReached,
    /// The configured page cap was hit
    PageCap,
    /// A page came back with no records
    EndOfListing,
    /// A page after the first could not be fetched or parsed
    PageFailed,
    /// The request budget ran out or the caller went away
    Cancelled,
}

/// Complaint extraction coordinator
#[derive(Clone)]
pub struct Coordinator {
    fetcher: Arc<dyn PageFetcher>,
    urls: UrlBuilder,
    max_pages: u32,
}

impl Coordinator {
    /// Creates a coordinator over the given fetcher
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of upstream pages
    /// * `urls` - Upstream URL layout
    /// * `max_pages` - Listing pages to fetch at most, clamped to `1..=UPSTREAM_PAGE_CAP`
    pub fn new(fetcher: Arc<dyn PageFetcher>, urls: UrlBuilder, max_pages: u32) -> Self {
        Self {
            fetcher,
            urls,
            max_pages: max_pages.clamp(1, UPSTREAM_PAGE_CAP),
        }
    }

    /// Creates a coordinator using the upstream section of the configuration
    pub fn from_config(
        fetcher: Arc<dyn PageFetcher>,
        config: &UpstreamConfig,
    ) -> std::result::Result<Self, ConfigError> {
        let urls = UrlBuilder::new(&config.base_url)?;
        Ok(Self::new(fetcher, urls, config.max_pages))
    }

    /// Collects up to `query.limit()` complaints, most recent first
    pub async fn get_complaints(&self, query: &ComplaintQuery) -> Result<ComplaintQueryResult> {
        self.get_complaints_until(query, &CancellationToken::new())
            .await
    }

    /// Like [`Coordinator::get_complaints`], stopping early once `cancel` fires
    ///
    /// Cancellation is checked between listing pages; the complaints gathered
    /// before it fired are returned.
    ///
    /// # Errors
    ///
    /// * `CompanyNotFound` - The slug does not resolve upstream
    /// * `Upstream` - The profile page or listing page 1 could not be fetched
    /// * `Format` - The profile page or listing page 1 could not be parsed
    pub async fn get_complaints_until(
        &self,
        query: &ComplaintQuery,
        cancel: &CancellationToken,
    ) -> Result<ComplaintQueryResult> {
        let slug = query.company_slug();
        tracing::info!(
            "Collecting complaints for {} (limit {}, status {})",
            slug,
            query.limit(),
            query.status().map(|s| s.as_str()).unwrap_or("any")
        );

        let company = self.fetch_company(slug).await?;
        let (complaints, reason) = self.collect_complaints(query, cancel).await?;

        tracing::info!(
            "Collected {} complaints for {} (stopped: {:?})",
            complaints.len(),
            slug,
            reason
        );

        Ok(ComplaintQueryResult::new(company, complaints))
    }

    /// Fetches and parses the company profile page
    async fn fetch_company(&self, slug: &str) -> Result<Company> {
        let url = self.urls.company_url(slug);

        let html = match self.fetcher.fetch(url.as_str()).await {
            Ok(html) => html,
            Err(e) if e.is_not_found() => {
                return Err(RelayError::CompanyNotFound {
                    slug: slug.to_string(),
                })
            }
            Err(e) => {
                tracing::error!("Profile fetch failed for {}: {}", slug, e);
                return Err(e.into());
            }
        };

        match parse_company_page(&html)? {
            Some(company) => Ok(company),
            None => Err(RelayError::CompanyNotFound {
                slug: slug.to_string(),
            }),
        }
    }

    /// Walks the listing until a stop condition is met
    async fn collect_complaints(
        &self,
        query: &ComplaintQuery,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Complaint>, StopReason)> {
        let slug = query.company_slug();
        let limit = query.limit();
        let context = ListingContext {
            company_slug: slug,
            urls: &self.urls,
        };

        let mut collected: Vec<Complaint> = Vec::with_capacity(limit);
        let mut seen: HashSet<String> = HashSet::new();
        let mut reason = StopReason::PageCap;

        for page in 1..=self.max_pages {
            if page > 1 && cancel.is_cancelled() {
                tracing::warn!("Stopping {} before page {}: request cancelled", slug, page);
                reason = StopReason::Cancelled;
                break;
            }

            let url = self.urls.listing_url(slug, page, query.status());
            let records = match self.read_listing_page(url.as_str(), &context).await {
                Ok(records) => records,
                Err(e) if page == 1 => {
                    tracing::error!("Listing page 1 failed for {}: {}", slug, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        "Stopping {} at page {} with {} complaints: {}",
                        slug,
                        page,
                        collected.len(),
                        e
                    );
                    reason = StopReason::PageFailed;
                    break;
                }
            };

            if records.is_empty() {
                tracing::debug!("Page {} of {} is empty, end of listing", page, slug);
                reason = StopReason::EndOfListing;
                break;
            }

            let page_size = records.len();
            for complaint in records {
                if !seen.insert(complaint.id.clone()) {
                    continue;
                }
                if query.status().is_some_and(|status| complaint.status != status) {
                    continue;
                }
                collected.push(complaint);
                if collected.len() >= limit {
                    break;
                }
            }

            tracing::debug!(
                "Page {} of {}: {} records, {} collected",
                page,
                slug,
                page_size,
                collected.len()
            );

            if collected.len() >= limit {
                reason = StopReason::LimitReached;
                break;
            }
        }

        collected.truncate(limit);
        Ok((collected, reason))
    }

    async fn read_listing_page(
        &self,
        url: &str,
        context: &ListingContext<'_>,
    ) -> Result<Vec<Complaint>> {
        let html = self.fetcher.fetch(url).await?;
        Ok(parse_listing_page(&html, context)?)
    }
}
