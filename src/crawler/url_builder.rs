use crate::model::Status;
use crate::ConfigError;
use url::Url;

/// Builds upstream page URLs from the configured base
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
}

impl UrlBuilder {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

        // Keep a trailing slash so relative joins append instead of replacing
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    /// Company profile page: `/empresa/{slug}/`
    pub fn company_url(&self, slug: &str) -> Url {
        self.with_segments(&["empresa", slug, ""])
    }

    /// One page of the complaint listing, optionally pre-filtered upstream
    pub fn listing_url(&self, slug: &str, page: u32, status: Option<Status>) -> Url {
        let mut url = self.with_segments(&["empresa", slug, "lista-reclamacoes", ""]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pagina", &page.to_string());
            if let Some(status) = status {
                query.append_pair("status", status.as_str());
            }
        }
        url
    }

    /// Company search page
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.with_segments(&["busca", ""]);
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    /// Resolves a possibly relative link found in a page
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.base
            .join(href.trim())
            .ok()
            .filter(|url| url.scheme() == "http" || url.scheme() == "https")
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            // Drop the empty segment left by the base's trailing slash
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
