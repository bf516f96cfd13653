//! # Investigator Module
//!
//! Wires the configured providers into the investigation engine and turns
//! its outcome into report files.
//! It demonstrates:
//! - Trait objects (`Arc<dyn Trait>`) for swappable backends
//! - Async file I/O with tokio::fs
//! - Separating construction from execution so tests can inject mocks

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use investigation_core::{
    EngineSettings, FeedbackAnalyzer, FirecrawlSearch, InvestigationEngine, InvestigationOutcome,
    InvestigationRequest, LLMConfig, ProgressObserver, PromptBudgeter, ReportInput,
    ReportSynthesizer, RigGenerator, SearchProvider, StructuredGenerator, TavilySearch,
    TiktokenTokenCounter,
};

use crate::config::{Config, ConfigError, LlmProvider, SearchBackend};

// =============================================================================
// REPORT TYPE
// =============================================================================
/// A finished investigation: the markdown report and what it was built from.
#[derive(Debug, Clone)]
pub struct InvestigationReport {
    pub markdown: String,
    pub outcome: InvestigationOutcome,
}

// =============================================================================
// INVESTIGATOR STRUCT
// =============================================================================
/// Runs one investigation end to end: engine, then report synthesis.
///
/// # Rust Concept: Trait Objects
///
/// `Arc<dyn StructuredGenerator>` can hold a Rig-backed generator in
/// production and a canned mock in tests. The engine never knows which.
pub struct Investigator {
    config: Config,
    generator: Arc<dyn StructuredGenerator>,
    search: Arc<dyn SearchProvider>,
    budgeter: PromptBudgeter,
}

impl Investigator {
    pub fn new(
        config: Config,
        generator: Arc<dyn StructuredGenerator>,
        search: Arc<dyn SearchProvider>,
        budgeter: PromptBudgeter,
    ) -> Self {
        Self {
            config,
            generator,
            search,
            budgeter,
        }
    }

    /// Build the real providers named by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let generator = build_generator(&config)?;
        let search = build_search(&config)?;

        // o200k_base is the encoding of the o-series and GPT-4o models
        let counter = TiktokenTokenCounter::o200k_base()
            .context("Failed to load the o200k_base tokenizer")?;
        let budgeter = PromptBudgeter::new(Arc::new(counter));

        Ok(Self::new(config, generator, search, budgeter))
    }

    /// Investigate `query` and synthesize the report.
    ///
    /// Branch failures only thin out the outcome; planning the first level
    /// or writing the report failing aborts the run.
    pub async fn investigate(
        &self,
        query: &str,
        observer: Option<Arc<dyn ProgressObserver>>,
    ) -> Result<InvestigationReport> {
        info!(
            query = %query,
            breadth = self.config.breadth,
            depth = self.config.depth,
            "Starting investigation"
        );

        let settings = EngineSettings::default().with_context_size(self.config.context_size);
        let engine = InvestigationEngine::new(
            self.generator.clone(),
            self.search.clone(),
            self.budgeter.clone(),
            settings,
        );

        let outcome = engine
            .conduct_investigation(
                InvestigationRequest::new(query, self.config.breadth, self.config.depth),
                observer,
            )
            .await
            .context("Investigation failed")?;

        info!(
            insights = outcome.insights.len(),
            sources = outcome.explored_sources.len(),
            "Investigation finished"
        );

        let synthesizer = ReportSynthesizer::new(
            self.generator.clone(),
            self.budgeter.clone(),
            engine.settings().context_size,
        );
        let markdown = synthesizer
            .generate_analysis_report(&ReportInput::new(query, outcome.clone()))
            .await
            .context("Report synthesis failed")?;

        Ok(InvestigationReport { markdown, outcome })
    }

    /// Analyze reader feedback against a finished report.
    pub async fn analyze_feedback(&self, feedback: &str, report: &str) -> Result<String> {
        FeedbackAnalyzer::new(self.generator.clone())
            .process_feedback(feedback, report)
            .await
            .context("Feedback analysis failed")
    }

    pub fn report_dir(&self) -> &Path {
        &self.config.report_dir
    }
}

// =============================================================================
// PROVIDER CONSTRUCTION
// =============================================================================
/// # Rust Concept: Environment Variable Configuration
///
/// Rig's clients read their settings from the environment, so the resolved
/// configuration is exported before the client is created.
fn build_generator(config: &Config) -> Result<Arc<dyn StructuredGenerator>> {
    let llm_config = LLMConfig::new(&config.model);

    let generator = match config.llm_provider {
        LlmProvider::OpenAi => {
            let key = config
                .openai_key
                .as_deref()
                .ok_or(ConfigError::MissingKey("OPENAI_KEY (or OPENAI_API_KEY)"))?;
            std::env::set_var("OPENAI_API_KEY", key);
            std::env::set_var("OPENAI_BASE_URL", &config.openai_endpoint);
            RigGenerator::openai_from_env(llm_config)
        }
        LlmProvider::Ollama => {
            std::env::set_var("OLLAMA_API_BASE_URL", &config.ollama_host);
            RigGenerator::ollama_from_env(llm_config)
        }
    };

    debug!(provider = ?config.llm_provider, model = %config.model, "LLM provider ready");
    Ok(Arc::new(generator))
}

fn build_search(config: &Config) -> Result<Arc<dyn SearchProvider>> {
    let search: Arc<dyn SearchProvider> = match config.search_backend {
        SearchBackend::Firecrawl => Arc::new(FirecrawlSearch::new(
            config.firecrawl_key.clone(),
            config.firecrawl_base_url.clone(),
        )),
        SearchBackend::Tavily => {
            let key = config
                .tavily_key
                .clone()
                .ok_or(ConfigError::MissingKey("TAVILY_API_KEY"))?;
            Arc::new(TavilySearch::new(key))
        }
    };

    debug!(provider = search.name(), "Search provider ready");
    Ok(search)
}

// =============================================================================
// REPORT FILES
// =============================================================================
/// `{prefix}-{timestamp}.md`, with `:` and `.` in the timestamp replaced by
/// `-` so the name is valid on every filesystem.
pub fn timestamped_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}-{}.md", prefix, stamp)
}

/// Write `contents` to a new timestamped file in `dir`, creating the
/// directory if needed.
pub async fn write_report(dir: &Path, prefix: &str, contents: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let path = dir.join(timestamped_file_name(prefix, Utc::now()));
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "Report written");
    Ok(path)
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use investigation_core::{
        ApproxTokenCounter, GenerationError, GenerationRequest, SearchError, SearchItem,
        SearchOptions, SearchResponse,
    };
    use serde_json::{json, Value};

    struct ScriptedGenerator;

    #[async_trait]
    impl StructuredGenerator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
            Ok(match request.schema.name.as_str() {
                "research_queries" => json!({
                    "queries": [{"inquiry": "battery chemistry", "investigationIntent": "compare cells"}]
                }),
                "search_digest" => json!({
                    "insights": ["LFP cells tolerate heat."],
                    "followUpInquiries": ["What about sodium?"]
                }),
                "analysis_report" => json!({"reportMarkdown": "# Batteries"}),
                _ => json!({"analysis": "Fine.", "actionableSteps": ["Add charts"]}),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    struct OnePageSearch;

    #[async_trait]
    impl SearchProvider for OnePageSearch {
        async fn search(
            &self,
            _query: &str,
            _options: &SearchOptions,
        ) -> Result<SearchResponse, SearchError> {
            Ok(SearchResponse {
                data: vec![SearchItem::new("https://cells.test", "LFP cells tolerate heat.")],
            })
        }

        fn name(&self) -> &str {
            "one-page"
        }
    }

    fn investigator(report_dir: PathBuf) -> Investigator {
        let config = Config {
            breadth: 1,
            depth: 1,
            report_dir,
            ..Config::default()
        };
        Investigator::new(
            config,
            Arc::new(ScriptedGenerator),
            Arc::new(OnePageSearch),
            PromptBudgeter::new(Arc::new(ApproxTokenCounter::default())),
        )
    }

    #[test]
    fn test_timestamped_file_name() {
        let now = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            timestamped_file_name("report", now),
            "report-2025-02-03T04-05-06-000Z.md"
        );
    }

    #[tokio::test]
    async fn test_investigate_produces_report_with_sources() {
        let investigator = investigator(PathBuf::from("."));

        let report = investigator.investigate("batteries", None).await.unwrap();

        assert_eq!(report.outcome.insights, vec!["LFP cells tolerate heat."]);
        assert_eq!(
            report.markdown,
            "# Batteries\n\n## Reference Sources\n\n- https://cells.test"
        );
    }

    #[tokio::test]
    async fn test_feedback_analysis() {
        let investigator = investigator(PathBuf::from("."));

        let analysis = investigator
            .analyze_feedback("More visuals", "# Batteries")
            .await
            .unwrap();

        assert_eq!(analysis, "Analysis:\nFine.\n\nActionable Steps:\n1. Add charts");
    }

    #[tokio::test]
    async fn test_write_report_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("reports");

        let path = write_report(&dir, "report", "# Report").await.unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("report-") && name.ends_with(".md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report");
    }

    #[test]
    fn test_tavily_without_key_is_rejected() {
        let config = Config {
            search_backend: SearchBackend::Tavily,
            ..Config::default()
        };
        assert!(build_search(&config).is_err());
    }
}
