//! Error types
//!
//! Three layers, matching where failures are handled:
//! - `SearchError`: search provider failures (branch-local inside the engine)
//! - `GenerationError`: structured-generation failures (branch-local when
//!   digesting, fatal when planning the top-level call or writing the report)
//! - `InvestigationError`: what the public operations return

use std::time::Duration;
use thiserror::Error;

/// Search provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Missing API key: {0} is not set")]
    MissingApiKey(&'static str),
}

impl SearchError {
    /// Map a transport-level reqwest failure onto a typed variant
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Connection(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }

    /// Map a non-success HTTP status onto a typed variant
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => SearchError::BadRequest(body),
            401 | 403 => SearchError::Unauthorized,
            429 => SearchError::RateLimited,
            500..=599 => SearchError::ServerError(status, body),
            _ => SearchError::HttpError(status, body),
        }
    }
}

/// Structured-generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response does not match schema '{schema}': {message}")]
    SchemaViolation { schema: String, message: String },
}

/// Top-level error for investigation and report operations
#[derive(Error, Debug)]
pub enum InvestigationError {
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InvestigationError {
    /// Whether this failure was a timeout (search or generation)
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            InvestigationError::Search(SearchError::Timeout)
                | InvestigationError::Generation(GenerationError::Timeout(_))
        )
    }
}
