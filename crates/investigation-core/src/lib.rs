//! investigation-core: recursive, breadth/depth-bounded web investigation
//!
//! Plans search queries with an LLM, digests the scraped results into
//! insights and follow-up questions, recurses on the follow-ups with
//! halving width and decreasing depth, then synthesizes a markdown report.
//! - TextSplitter / PromptBudgeter: fit scraped pages into a token budget
//! - QueryPlanner / ResultDigester: structured-generation steps
//! - InvestigationEngine: the recursive fan-out
//! - ReportSynthesizer: final report with reference list
//! - ProgressReporter: throttled single-line terminal progress
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use investigation_core::{
//!     ApproxTokenCounter, EngineSettings, FirecrawlSearch, InvestigationEngine,
//!     InvestigationRequest, LLMConfig, ProgressReporter, PromptBudgeter, ReportInput,
//!     ReportSynthesizer, RigGenerator,
//! };
//!
//! let generator = Arc::new(RigGenerator::openai_from_env(LLMConfig::new("o3-mini")));
//! let search = Arc::new(FirecrawlSearch::from_env());
//! let budgeter = PromptBudgeter::new(Arc::new(ApproxTokenCounter::default()));
//!
//! let engine = InvestigationEngine::new(generator.clone(), search, budgeter.clone(), EngineSettings::default());
//! let outcome = engine
//!     .conduct_investigation(
//!         InvestigationRequest::new("sodium-ion batteries", 3, 2),
//!         Some(Arc::new(ProgressReporter::stdout())),
//!     )
//!     .await?;
//!
//! let report = ReportSynthesizer::new(generator, budgeter, 128_000)
//!     .generate_analysis_report(&ReportInput::new("sodium-ion batteries", outcome))
//!     .await?;
//! ```

pub mod budget;
pub mod config;
pub mod error;
pub mod llm;
pub mod log_buffer;
pub mod progress;
pub mod research;
pub mod search;
pub mod text_splitter;
pub mod tokenization;

pub use budget::{PromptBudgeter, CHARS_PER_TOKEN_ESTIMATE, MIN_SEGMENT_SIZE};
pub use config::EngineSettings;
pub use error::{GenerationError, InvestigationError, SearchError};
pub use llm::{
    generate_object, GenerationRequest, LLMConfig, ObjectSchema, RigBackend, RigGenerator,
    StructuredGenerator,
};
pub use log_buffer::InvestigationLog;
pub use progress::ProgressReporter;
pub use search::{
    FirecrawlSearch, SearchDepth, SearchItem, SearchOptions, SearchProvider, SearchResponse,
    TavilySearch, Topic,
};
pub use text_splitter::{SplitterConfig, TextSplitter};
pub use tokenization::{ApproxTokenCounter, TokenCounter};

#[cfg(feature = "tokenizer-tiktoken")]
pub use tokenization::TiktokenTokenCounter;

pub use research::{
    FeedbackAnalyzer, InvestigationEngine, InvestigationOutcome, InvestigationProgress,
    InvestigationRequest, ProcessedInsight, ProgressObserver, QueryPlanner, ReportInput,
    ReportSynthesizer, ResultDigester, SearchQueryMetadata,
};
