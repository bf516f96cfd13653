//! Web search providers
//!
//! `SearchProvider` returns scraped pages (URL + markdown) for a query.
//! Two implementations are provided:
//! - `FirecrawlSearch`: Firecrawl `/v1/search` with markdown scraping
//! - `TavilySearch`: Tavily `/search` with raw content
//!
//! Neither retries: a failed search is a failed branch.

pub mod firecrawl;
pub mod tavily;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub use firecrawl::FirecrawlSearch;
pub use tavily::{SearchDepth, TavilySearch, Topic};

/// Per-call search options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub timeout: Duration,
    pub limit: usize,
    /// Scrape formats to request, e.g. `["markdown"]`
    pub scrape_formats: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            limit: 5,
            scrape_formats: vec!["markdown".to_string()],
        }
    }
}

/// One search hit; providers may omit any field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl SearchItem {
    pub fn new(url: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            markdown: Some(markdown.into()),
            title: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchItem>,
}

impl SearchResponse {
    /// URLs of all items that carry one
    pub fn urls(&self) -> Vec<String> {
        self.data.iter().filter_map(|item| item.url.clone()).collect()
    }

    /// Non-empty markdown bodies, in result order
    pub fn markdown_contents(&self) -> Vec<&str> {
        self.data
            .iter()
            .filter_map(|item| item.markdown.as_deref())
            .filter(|markdown| !markdown.is_empty())
            .collect()
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError>;

    /// Provider name for logging/debugging
    fn name(&self) -> &str;
}
