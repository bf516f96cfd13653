//! # Configuration Module
//!
//! Loads the CLI configuration from the environment (and a `.env` file),
//! then validates it before any provider is contacted.
//! It demonstrates:
//! - The Default trait for sensible defaults
//! - FromStr for parsing enum-valued settings
//! - Library errors with thiserror, application errors with anyhow

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;

// =============================================================================
// PROVIDER SELECTION
// =============================================================================
/// # Rust Concept: Typed Errors for Parsing
///
/// `FromStr` needs an error type. A small thiserror enum gives each failure
/// a readable message while staying matchable in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown LLM_PROVIDER '{0}' (expected 'openai' or 'ollama')")]
    UnknownLlmProvider(String),

    #[error("Unknown SEARCH_PROVIDER '{0}' (expected 'firecrawl' or 'tavily')")]
    UnknownSearchProvider(String),

    #[error("{0} must be set")]
    MissingKey(&'static str),
}

/// Which LLM backend serves structured generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnknownLlmProvider(other.to_string())),
        }
    }
}

/// Which web search backend scrapes pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    Firecrawl,
    Tavily,
}

impl FromStr for SearchBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firecrawl" => Ok(SearchBackend::Firecrawl),
            "tavily" => Ok(SearchBackend::Tavily),
            other => Err(ConfigError::UnknownSearchProvider(other.to_string())),
        }
    }
}

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the investigator.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_provider: LlmProvider,

    /// Model used for every generation call (e.g., "o3-mini", "llama3.2")
    pub model: String,

    /// OpenAI API key; required when `llm_provider` is OpenAI
    pub openai_key: Option<String>,

    /// OpenAI-compatible endpoint
    pub openai_endpoint: String,

    /// Ollama server URL (default: http://localhost:11434)
    pub ollama_host: String,

    pub search_backend: SearchBackend,

    /// Firecrawl key; may be empty for self-hosted instances
    pub firecrawl_key: String,

    /// Firecrawl base URL; None means the hosted API
    pub firecrawl_base_url: Option<String>,

    pub tavily_key: Option<String>,

    /// Token budget of the report prompt
    pub context_size: usize,

    /// Queries planned at the top level
    pub breadth: usize,

    /// Recursion levels
    pub depth: usize,

    /// Where report files are written
    pub report_dir: PathBuf,
}

// =============================================================================
// DEFAULT IMPLEMENTATION
// =============================================================================
impl Default for Config {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::OpenAi,
            model: "o3-mini".to_string(),
            openai_key: None,
            openai_endpoint: "https://api.openai.com/v1".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            search_backend: SearchBackend::Firecrawl,
            firecrawl_key: String::new(),
            firecrawl_base_url: None,
            tavily_key: None,
            context_size: 128_000,
            breadth: 3,
            depth: 3,
            report_dir: PathBuf::from("."),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Rust Concept: Layered Configuration
    ///
    /// Start from `Default`, then let each set variable override one field.
    /// Unset variables keep their defaults; malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("LLM_PROVIDER") {
            config.llm_provider = val.parse()?;
        }

        if let Ok(val) = env::var("OPENAI_MODEL") {
            config.model = val;
        }

        // OPENAI_KEY wins over the SDK-standard OPENAI_API_KEY
        config.openai_key = env::var("OPENAI_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());

        if let Ok(val) = env::var("OPENAI_ENDPOINT") {
            config.openai_endpoint = val;
        }

        if let Ok(val) = env::var("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Ok(val) = env::var("SEARCH_PROVIDER") {
            config.search_backend = val.parse()?;
        }

        if let Ok(val) = env::var("FIRECRAWL_KEY") {
            config.firecrawl_key = val;
        }

        config.firecrawl_base_url = env::var("FIRECRAWL_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty());

        config.tavily_key = env::var("TAVILY_API_KEY").ok().filter(|key| !key.is_empty());

        if let Ok(val) = env::var("CONTEXT_SIZE") {
            config.context_size = val
                .parse()
                .context("CONTEXT_SIZE must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("RESEARCH_BREADTH") {
            config.breadth = val
                .parse()
                .context("RESEARCH_BREADTH must be a valid positive integer")?;
        }

        if let Ok(val) = env::var("RESEARCH_DEPTH") {
            config.depth = val
                .parse()
                .context("RESEARCH_DEPTH must be a valid non-negative integer")?;
        }

        // Containers mount the report volume at /app/reports
        if env::var("NODE_ENV").map(|v| v == "production").unwrap_or(false) {
            config.report_dir = PathBuf::from("/app/reports");
        }

        if let Ok(val) = env::var("REPORT_DIR") {
            config.report_dir = PathBuf::from(val);
        }

        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Fails fast on anything that would only surface after the first
    /// network round trip.
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            anyhow::bail!("OPENAI_MODEL cannot be empty");
        }

        if self.breadth == 0 {
            anyhow::bail!("Research breadth must be at least 1");
        }

        if self.context_size == 0 {
            anyhow::bail!("CONTEXT_SIZE must be at least 1");
        }

        if self.llm_provider == LlmProvider::OpenAi && self.openai_key.is_none() {
            return Err(ConfigError::MissingKey("OPENAI_KEY (or OPENAI_API_KEY)").into());
        }

        if self.search_backend == SearchBackend::Tavily && self.tavily_key.is_none() {
            return Err(ConfigError::MissingKey("TAVILY_API_KEY").into());
        }

        Ok(())
    }
}
