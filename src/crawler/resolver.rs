//! Company name to slug resolution

use crate::config::UpstreamConfig;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::parse_search_results;
use crate::crawler::url_builder::UrlBuilder;
use crate::model::{validate_search_query, CompanySummary};
use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Looks up companies by name through the upstream search page
#[derive(Clone)]
pub struct CompanyResolver {
    fetcher: Arc<dyn PageFetcher>,
    urls: UrlBuilder,
    max_results: usize,
}

impl CompanyResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, urls: UrlBuilder, max_results: usize) -> Self {
        Self {
            fetcher,
            urls,
            max_results: max_results.max(1),
        }
    }

    pub fn from_config(
        fetcher: Arc<dyn PageFetcher>,
        config: &UpstreamConfig,
    ) -> std::result::Result<Self, ConfigError> {
        let urls = UrlBuilder::new(&config.base_url)?;
        Ok(Self::new(fetcher, urls, config.max_search_results))
    }

    /// Searches for companies matching `query`, in upstream relevance order
    ///
    /// The query is validated before anything is fetched. No matches is an
    /// empty vector, not an error.
    pub async fn search_companies(&self, query: &str) -> Result<Vec<CompanySummary>> {
        let query = validate_search_query(query)?;
        let url = self.urls.search_url(query);

        tracing::info!("Searching companies: {}", query);
        let html = self.fetcher.fetch(url.as_str()).await?;
        let rows = parse_search_results(&html)?;

        let found = rows.len();
        let companies = clean_results(rows, self.max_results);
        tracing::info!(
            "Search '{}' matched {} companies ({} rows upstream)",
            query,
            companies.len(),
            found
        );

        Ok(companies)
    }
}

/// Whether a search row points at something other than a company profile
fn is_junk_slug(slug: &str) -> bool {
    slug.chars().count() <= 1 || slug.starts_with("ra-") || slug.contains("lista-reclamacoes")
}

/// Drops junk rows and collapses repeated slugs
///
/// A repeated slug keeps its first position and the longest display name seen.
fn clean_results(rows: Vec<CompanySummary>, max_results: usize) -> Vec<CompanySummary> {
    let mut cleaned: Vec<CompanySummary> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if is_junk_slug(&row.slug) || row.name.is_empty() {
            tracing::debug!("Dropping search row {:?}", row);
            continue;
        }

        match positions.get(&row.slug) {
            Some(&index) => {
                if row.name.chars().count() > cleaned[index].name.chars().count() {
                    cleaned[index].name = row.name;
                }
            }
            None => {
                positions.insert(row.slug.clone(), cleaned.len());
                cleaned.push(row);
            }
        }
    }

    cleaned.truncate(max_results);
    cleaned
}
