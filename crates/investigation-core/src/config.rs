//! Engine settings
//!
//! Limits and timeouts shared by the planner, digester, engine and report
//! synthesizer. Tests shrink the timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::search::SearchOptions;

/// Tunable limits for one investigation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use investigation_core::EngineSettings;
///
/// let settings = EngineSettings::default()
///     .with_concurrency_limit(4)
///     .with_digest_timeout(Duration::from_secs(90));
///
/// assert_eq!(settings.concurrency_limit, 4);
/// assert_eq!(settings.search_limit, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// In-flight branches per `conduct_investigation` call
    pub concurrency_limit: usize,
    pub search_timeout: Duration,
    /// Results requested per search
    pub search_limit: usize,
    /// Timeout for one result-digest generation
    pub digest_timeout: Duration,
    /// Token budget for each scraped page before digestion
    pub digest_token_budget: usize,
    /// Insights kept per digested query
    pub insight_limit: usize,
    /// Token budget for the insight block of the final report prompt
    pub context_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: 2,
            search_timeout: Duration::from_secs(15),
            search_limit: 5,
            digest_timeout: Duration::from_secs(60),
            digest_token_budget: 25_000,
            insight_limit: 3,
            context_size: 128_000,
        }
    }
}

impl EngineSettings {
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn with_digest_timeout(mut self, timeout: Duration) -> Self {
        self.digest_timeout = timeout;
        self
    }

    pub fn with_context_size(mut self, context_size: usize) -> Self {
        self.context_size = context_size;
        self
    }

    /// Search options derived from these settings (markdown scraping)
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            timeout: self.search_timeout,
            limit: self.search_limit,
            ..SearchOptions::default()
        }
    }
}
