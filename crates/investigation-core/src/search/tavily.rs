//! Tavily search provider
//!
//! Calls the Tavily Search API with `include_raw_content` so each hit carries
//! the page text; the raw content becomes the item's markdown, falling back
//! to Tavily's extracted snippet.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SearchItem, SearchOptions, SearchProvider, SearchResponse};
use crate::error::SearchError;

pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

/// Tavily caps `max_results` at 20
const MAX_RESULTS_LIMIT: usize = 20;

/// Search depth for Tavily API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with basic results
    #[default]
    Basic,
    /// More thorough search with detailed results
    Advanced,
}

/// Topic filter for Tavily API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// General web search
    #[default]
    General,
    /// Recent news articles
    News,
}

pub struct TavilySearch {
    api_key: String,
    base_url: String,
    client: Client,
    search_depth: SearchDepth,
    topic: Topic,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_TAVILY_URL.to_string(),
            client: Client::new(),
            search_depth: SearchDepth::default(),
            topic: Topic::default(),
        }
    }

    /// Create from environment variable TAVILY_API_KEY
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key =
            std::env::var("TAVILY_API_KEY").map_err(|_| SearchError::MissingApiKey("TAVILY_API_KEY"))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }
}

/// Request body for Tavily API
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: SearchDepth,
    topic: Topic,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    raw_content: Option<String>,
}

impl From<TavilyResult> for SearchItem {
    fn from(result: TavilyResult) -> Self {
        let markdown = result
            .raw_content
            .filter(|raw| !raw.is_empty())
            .or(result.content);
        SearchItem {
            url: result.url,
            markdown,
            title: result.title,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        let request = TavilyRequest {
            query,
            max_results: options.limit.clamp(1, MAX_RESULTS_LIMIT),
            search_depth: self.search_depth,
            topic: self.topic,
            include_answer: false,
            include_raw_content: true,
        };

        debug!(query = %query, max_results = request.max_results, "Tavily search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(SearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchError::from_status(status.as_u16(), error_text));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        Ok(SearchResponse {
            data: body.results.into_iter().map(SearchItem::from).collect(),
        })
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
