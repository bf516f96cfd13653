//! Firecrawl search provider
//!
//! Calls `POST {base}/v1/search` and asks Firecrawl to scrape each hit in
//! the requested formats, so results arrive with page markdown attached.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{SearchItem, SearchOptions, SearchProvider, SearchResponse};
use crate::error::SearchError;

/// Hosted Firecrawl API
pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev";

pub struct FirecrawlSearch {
    api_key: String,
    base_url: String,
    client: Client,
}

impl FirecrawlSearch {
    /// `api_key` may be empty for self-hosted instances without auth.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_FIRECRAWL_URL.to_string());
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create from FIRECRAWL_KEY and FIRECRAWL_BASE_URL
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("FIRECRAWL_KEY").unwrap_or_default(),
            std::env::var("FIRECRAWL_BASE_URL").ok(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FirecrawlRequest<'a> {
    query: &'a str,
    limit: usize,
    /// Milliseconds
    timeout: u64,
    scrape_options: ScrapeOptions<'a>,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions<'a> {
    formats: &'a [String],
}

#[derive(Debug, Deserialize)]
struct FirecrawlResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Vec<FirecrawlItem>,
    #[serde(default)]
    error: Option<String>,
}

/// Fields are loosely typed; anything that is not a string is dropped.
#[derive(Debug, Deserialize)]
struct FirecrawlItem {
    #[serde(default)]
    url: Option<Value>,
    #[serde(default)]
    markdown: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
}

impl From<FirecrawlItem> for SearchItem {
    fn from(item: FirecrawlItem) -> Self {
        fn string(value: Option<Value>) -> Option<String> {
            match value {
                Some(Value::String(s)) => Some(s),
                _ => None,
            }
        }

        SearchItem {
            url: string(item.url),
            markdown: string(item.markdown),
            title: string(item.title),
        }
    }
}

#[async_trait]
impl SearchProvider for FirecrawlSearch {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        let request = FirecrawlRequest {
            query,
            limit: options.limit,
            timeout: options.timeout.as_millis() as u64,
            scrape_options: ScrapeOptions {
                formats: &options.scrape_formats,
            },
        };

        debug!(query = %query, limit = options.limit, "Firecrawl search");

        let mut builder = self
            .client
            .post(format!("{}/v1/search", self.base_url))
            .timeout(options.timeout)
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = builder.send().await.map_err(SearchError::from_transport)?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchError::from_status(status.as_u16(), error_text));
        }

        let body: FirecrawlResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::ParseError(e.to_string())
            }
        })?;

        if body.success == Some(false) {
            return Err(SearchError::BadRequest(
                body.error.unwrap_or_else(|| "search unsuccessful".to_string()),
            ));
        }

        Ok(SearchResponse {
            data: body.data.into_iter().map(SearchItem::from).collect(),
        })
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}
