//! Recursive web investigation
//!
//! # Module Structure
//!
//! - `types` - progress record, outcomes and planner/digester results
//! - `prompts` - prompt templates for every generation call
//! - `planner` - turns an inquiry into search queries
//! - `digester` - turns search results into insights and follow-ups
//! - `engine` - the recursive breadth/depth-bounded fan-out
//! - `report` - final markdown report with reference list
//! - `feedback` - analysis of reader feedback on a report

pub mod digester;
pub mod engine;
pub mod feedback;
pub mod planner;
pub mod prompts;
pub mod report;
pub mod types;

pub use digester::ResultDigester;
pub use engine::{InvestigationEngine, InvestigationRequest};
pub use feedback::FeedbackAnalyzer;
pub use planner::{QueryPlanner, DEFAULT_QUERY_COUNT};
pub use prompts::InvestigationPrompts;
pub use report::ReportSynthesizer;
pub use types::{
    InvestigationOutcome, InvestigationProgress, ProcessedInsight, ProgressObserver,
    ProgressUpdate, ReportInput, SearchQueryMetadata,
};
