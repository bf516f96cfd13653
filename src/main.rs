//! # Deep Investigator
//!
//! A recursive research CLI built on the investigation-core engine.
//!
//! This application demonstrates:
//! - Recursive, bounded-concurrency async fan-out (in the library)
//! - Swappable LLM and search backends behind trait objects
//! - CLI design with clap
//! - Structured logging with tracing
//! - Error handling with anyhow at the application edge
//!
//! ## Quick Start
//! ```bash
//! cargo run -- --breadth 3 --depth 2 "What limits sodium-ion battery adoption?"
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Configuration management
mod config;

/// Provider wiring and report files
mod agent;

// =============================================================================
// IMPORTS
// =============================================================================
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use investigation_core::{ProgressObserver, ProgressReporter};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::agent::{write_report, Investigator};
use crate::config::Config;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
/// # Rust Concept: Derive Macros with Clap
///
/// Clap's derive feature lets us define CLI arguments as a struct.
/// `env = "..."` lets an environment variable supply a flag's value.
#[derive(Parser, Debug)]
#[command(
    name = "deep-investigator",
    version,
    about = "Recursively researches a topic on the web and writes a markdown report",
    long_about = r#"
Deep Investigator - breadth/depth-bounded web research.

For the given topic it will:
  1. Plan several search queries with an LLM
  2. Search and scrape the web for each query
  3. Extract insights and follow-up questions from the pages
  4. Recurse on the follow-ups, halving the breadth at each level
  5. Write a long-form report with every source it visited

CONFIGURATION (environment or .env):
  LLM_PROVIDER       openai | ollama (default: openai)
  OPENAI_KEY         OpenAI API key
  OPENAI_MODEL       model name (default: o3-mini)
  SEARCH_PROVIDER    firecrawl | tavily (default: firecrawl)
  FIRECRAWL_KEY      Firecrawl API key
  TAVILY_API_KEY     Tavily API key

EXAMPLES:
  # Default breadth 3, depth 3
  deep-investigator "State of WebAssembly component model"

  # Narrow and shallow
  deep-investigator --breadth 2 --depth 1 "Rust async runtimes compared"

  # Analyze feedback on the generated report
  deep-investigator --feedback "Needs more benchmarks" "Rust web frameworks"
"#
)]
struct Args {
    /// The research topic or question to investigate
    #[arg(value_name = "QUERY", required = true, num_args = 1..)]
    query: Vec<String>,

    /// Queries planned at the top level (halved at each deeper level)
    #[arg(short = 'b', long = "breadth", env = "RESEARCH_BREADTH")]
    breadth: Option<usize>,

    /// Recursion levels
    #[arg(short = 'd', long = "depth", env = "RESEARCH_DEPTH")]
    depth: Option<usize>,

    /// Model to use (overrides OPENAI_MODEL)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Directory for report files (overrides REPORT_DIR)
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Feedback to analyze against the finished report
    #[arg(short = 'f', long = "feedback")]
    feedback: Option<String>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
}

impl Args {
    fn query(&self) -> String {
        self.query.join(" ").trim().to_string()
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(breadth) = self.breadth {
            config.breadth = breadth;
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(model) = &self.model {
            info!(model = %model, "Using model from command line");
            config.model = model.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.report_dir = dir.clone();
        }
    }
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    let query = args.query();
    if query.is_empty() {
        anyhow::bail!("The research query cannot be empty");
    }

    let mut config = Config::from_env()?;
    args.apply(&mut config);
    config.validate()?;

    info!(
        provider = ?config.llm_provider,
        model = %config.model,
        search = ?config.search_backend,
        breadth = config.breadth,
        depth = config.depth,
        "Configuration loaded"
    );

    let investigator = Investigator::from_config(config)?;

    // Progress goes to stdout on one line; logs go to stderr.
    let reporter = Arc::new(ProgressReporter::stdout());
    let observer: Arc<dyn ProgressObserver> = reporter.clone();
    let result = investigator.investigate(&query, Some(observer)).await;
    reporter.finish();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            // No report is written when the run fails.
            error!(error = %format!("{:#}", e), "Investigation failed");
            return Err(e);
        }
    };

    let path = write_report(investigator.report_dir(), "report", &report.markdown).await?;

    println!("\n{}", "=".repeat(60));
    println!("INVESTIGATION COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Insights:  {}", report.outcome.insights.len());
    println!("Sources:   {}", report.outcome.explored_sources.len());
    println!("Report:    {}", path.display());

    if let Some(feedback) = &args.feedback {
        let analysis = investigator
            .analyze_feedback(feedback, &report.markdown)
            .await?;
        let path = write_report(investigator.report_dir(), "feedback", &analysis).await?;
        println!("Feedback:  {}", path.display());
    }

    info!("Investigation completed successfully");
    Ok(())
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber for structured logging.
///
/// RUST_LOG, when set, takes precedence over `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
