//! In-memory upstream shared by unit tests

use crate::crawler::PageFetcher;
use crate::FetchError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Wraps `props` the way upstream embeds page data
pub fn next_data_page(props: Value) -> String {
    format!(
        r#"<html><body><div id="__next"></div><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
        json!({ "props": { "pageProps": props } })
    )
}

/// Upstream keyed by full URL; unknown URLs answer 404
#[derive(Default)]
pub struct FakeUpstream {
    pages: HashMap<String, Result<String, FetchError>>,
    delays: HashMap<String, Duration>,
    requested: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn page(mut self, url: &str, props: Value) -> Self {
        self.pages.insert(url.to_string(), Ok(next_data_page(props)));
        self
    }

    pub fn raw(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn fail(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
            }),
        );
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(FetchError::Transport {
                url: url.to_string(),
                message: "Connection refused".to_string(),
            }),
        );
        self
    }

    /// Holds the answer for `url` back by `delay`
    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// URLs fetched so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeUpstream {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.pages.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}
