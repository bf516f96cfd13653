//! Integration tests for the recursive investigation engine
//!
//! Search and generation are replaced by in-process mocks so the tests can
//! count recursion levels, observe the width passed to each level, inject
//! failures and timeouts, and check deduplication of the merged outcome.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use investigation_core::{
    ApproxTokenCounter, EngineSettings, GenerationError, GenerationRequest, InvestigationEngine,
    InvestigationError, InvestigationProgress, InvestigationRequest, ProgressObserver,
    PromptBudgeter, ReportInput, ReportSynthesizer, SearchError, SearchItem, SearchOptions,
    SearchProvider, SearchResponse, StructuredGenerator,
};

// =============================================================================
// Mock generator
// =============================================================================

/// Answers planner, digest and report requests by schema name.
///
/// Planned inquiries are named `c{call}-q{index}` so tests can target a
/// specific branch.
#[derive(Default)]
struct MockGenerator {
    planner_calls: AtomicUsize,
    digest_calls: AtomicUsize,
    /// Query count requested by each planner call, in call order
    requested_counts: Mutex<Vec<usize>>,
    /// Planner calls with an index at or above this fail
    fail_planning_from: Option<usize>,
    /// Digest requests whose inquiry contains this stall
    slow_digest_for: Option<String>,
}

impl MockGenerator {
    fn planner_calls(&self) -> usize {
        self.planner_calls.load(Ordering::SeqCst)
    }

    fn digest_calls(&self) -> usize {
        self.digest_calls.load(Ordering::SeqCst)
    }

    fn plan(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let call = self.planner_calls.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_planning_from, Some(from) if call >= from) {
            return Err(GenerationError::Provider("planner unavailable".into()));
        }

        let count = trailing_number(&request.schema.description);
        self.requested_counts.lock().unwrap().push(count);

        // Return one more query than asked for; the planner must cap it.
        let queries: Vec<Value> = (0..=count)
            .map(|i| {
                json!({
                    "inquiry": format!("c{}-q{}", call, i),
                    "investigationIntent": format!("intent of c{}-q{}", call, i)
                })
            })
            .collect();
        Ok(json!({ "queries": queries }))
    }

    async fn digest(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.digest_calls.fetch_add(1, Ordering::SeqCst);
        let inquiry = between(&request.prompt, "<inquiry>", "</inquiry>");

        if matches!(&self.slow_digest_for, Some(slow) if inquiry.contains(slow.as_str())) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }

        Ok(json!({
            "insights": ["shared insight", format!("insight from {}", inquiry)],
            "followUpInquiries": [
                format!("follow-up 1 of {}", inquiry),
                format!("follow-up 2 of {}", inquiry),
                format!("follow-up 3 of {}", inquiry)
            ]
        }))
    }
}

#[async_trait]
impl StructuredGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        match request.schema.name.as_str() {
            "research_queries" => self.plan(request),
            "search_digest" => self.digest(request).await,
            "analysis_report" => Ok(json!({ "reportMarkdown": "# Findings\n\nSummary." })),
            other => Err(GenerationError::Provider(format!("unexpected schema {}", other))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

fn trailing_number(text: &str) -> usize {
    text.rsplit(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .expect("schema description ends with the query count")
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    let from = text.find(start).map(|i| i + start.len()).unwrap_or(0);
    let to = text[from..].find(end).map(|i| from + i).unwrap_or(text.len());
    &text[from..to]
}

// =============================================================================
// Mock search provider
// =============================================================================

#[derive(Default)]
struct MockSearch {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    /// Inquiries that fail with a server error
    failing: HashSet<String>,
    /// Inquiries that never answer in time
    stalling: HashSet<String>,
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        if self.stalling.contains(query) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        assert_eq!(options.scrape_formats, vec!["markdown"]);
        if self.failing.contains(query) {
            return Err(SearchError::ServerError(502, "bad gateway".into()));
        }

        Ok(SearchResponse {
            data: vec![
                SearchItem::new("https://shared.test", "Shared page."),
                SearchItem::new(format!("https://{}.test", query), format!("Page about {}.", query)),
                SearchItem {
                    url: None,
                    markdown: Some("Page without a URL.".into()),
                    title: None,
                },
            ],
        })
    }

    fn name(&self) -> &str {
        "mock-search"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn settings() -> EngineSettings {
    EngineSettings::default()
        .with_search_timeout(Duration::from_millis(200))
        .with_digest_timeout(Duration::from_millis(200))
}

fn engine(generator: Arc<MockGenerator>, search: Arc<MockSearch>) -> InvestigationEngine {
    let budgeter = PromptBudgeter::new(Arc::new(ApproxTokenCounter::default()));
    InvestigationEngine::new(generator, search, budgeter, settings())
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Recursion shape
// =============================================================================

#[tokio::test]
async fn test_depth_bounds_recursion_levels() {
    let generator = Arc::new(MockGenerator::default());
    let engine = engine(generator.clone(), Arc::new(MockSearch::default()));

    engine
        .conduct_investigation(InvestigationRequest::new("topic", 1, 3), None)
        .await
        .unwrap();

    // One planning call per level: depth 3, 2 and 1.
    assert_eq!(generator.planner_calls(), 3);
    assert_eq!(generator.digest_calls(), 3);
}

#[tokio::test]
async fn test_depth_zero_does_not_recurse() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::default());
    let engine = engine(generator.clone(), search.clone());

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 2, 0), None)
        .await
        .unwrap();

    assert_eq!(generator.planner_calls(), 1);
    assert_eq!(generator.digest_calls(), 2);
    assert_eq!(search.calls.load(Ordering::SeqCst), 2);

    let insights: HashSet<String> = outcome.insights.into_iter().collect();
    assert_eq!(
        insights,
        set(&["shared insight", "insight from c0-q0", "insight from c0-q1"])
    );
    let sources: HashSet<String> = outcome.explored_sources.into_iter().collect();
    assert_eq!(
        sources,
        set(&["https://shared.test", "https://c0-q0.test", "https://c0-q1.test"])
    );
}

#[tokio::test]
async fn test_width_halves_rounding_up() {
    let generator = Arc::new(MockGenerator::default());
    let engine = engine(generator.clone(), Arc::new(MockSearch::default()));

    engine
        .conduct_investigation(InvestigationRequest::new("topic", 3, 3), None)
        .await
        .unwrap();

    let mut counts = generator.requested_counts.lock().unwrap().clone();
    counts.sort_unstable();

    // Level 1 plans 3, its 3 children plan 2 each, their 6 children plan 1.
    let mut expected = vec![3, 2, 2, 2, 1, 1, 1, 1, 1, 1];
    expected.sort_unstable();
    assert_eq!(counts, expected);
    assert_eq!(generator.digest_calls(), 3 + 6 + 6);
}

#[tokio::test]
async fn test_child_query_carries_intent_and_follow_ups() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch::default());
    let engine = engine(generator.clone(), search);

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 1, 2), None)
        .await
        .unwrap();

    // The leaf keeps the insights accumulated on the way down.
    assert!(outcome.insights.contains(&"insight from c0-q0".to_string()));
    assert!(outcome.insights.contains(&"insight from c1-q0".to_string()));
    assert!(outcome.explored_sources.contains(&"https://c0-q0.test".to_string()));
    assert!(outcome.explored_sources.contains(&"https://c1-q0.test".to_string()));
    assert!(engine
        .log()
        .entries()
        .iter()
        .any(|e| e.ends_with("Deepening investigation, width: 1, depth: 1")));
}

// =============================================================================
// Merging and failure isolation
// =============================================================================

#[tokio::test]
async fn test_sibling_duplicates_are_merged() {
    let generator = Arc::new(MockGenerator::default());
    let engine = engine(generator, Arc::new(MockSearch::default()));

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 3, 1), None)
        .await
        .unwrap();

    let shared_insights = outcome
        .insights
        .iter()
        .filter(|i| i.as_str() == "shared insight")
        .count();
    let shared_sources = outcome
        .explored_sources
        .iter()
        .filter(|s| s.as_str() == "https://shared.test")
        .count();

    assert_eq!(shared_insights, 1);
    assert_eq!(shared_sources, 1);
    assert_eq!(outcome.insights.len(), 4);
    assert_eq!(outcome.explored_sources.len(), 4);
}

#[tokio::test]
async fn test_failed_search_only_empties_its_branch() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        failing: set(&["c0-q1"]),
        ..Default::default()
    });
    let engine = engine(generator, search);

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 3, 1), None)
        .await
        .unwrap();

    assert!(outcome.insights.contains(&"insight from c0-q0".to_string()));
    assert!(outcome.insights.contains(&"insight from c0-q2".to_string()));
    assert!(!outcome.insights.contains(&"insight from c0-q1".to_string()));
    assert!(!outcome.explored_sources.contains(&"https://c0-q1.test".to_string()));
    assert!(engine
        .log()
        .entries()
        .iter()
        .any(|e| e.contains("Error processing query: c0-q1")));
}

#[tokio::test]
async fn test_search_timeout_is_branch_local() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        stalling: set(&["c0-q0"]),
        ..Default::default()
    });
    let engine = engine(generator, search);

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 2, 1), None)
        .await
        .unwrap();

    assert!(outcome.insights.contains(&"insight from c0-q1".to_string()));
    assert!(!outcome.insights.contains(&"insight from c0-q0".to_string()));
    assert!(engine
        .log()
        .entries()
        .iter()
        .any(|e| e.contains("Timeout encountered for query: c0-q0")));
}

#[tokio::test]
async fn test_digest_timeout_is_branch_local() {
    let generator = Arc::new(MockGenerator {
        slow_digest_for: Some("c0-q1".into()),
        ..Default::default()
    });
    let engine = engine(generator, Arc::new(MockSearch::default()));

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 2, 1), None)
        .await
        .unwrap();

    assert!(outcome.insights.contains(&"insight from c0-q0".to_string()));
    assert!(!outcome.explored_sources.contains(&"https://c0-q1.test".to_string()));
    assert!(engine
        .log()
        .entries()
        .iter()
        .any(|e| e.contains("Timeout encountered for query: c0-q1")));
}

#[tokio::test]
async fn test_top_level_planning_failure_propagates() {
    let generator = Arc::new(MockGenerator {
        fail_planning_from: Some(0),
        ..Default::default()
    });
    let engine = engine(generator, Arc::new(MockSearch::default()));

    let result = engine
        .conduct_investigation(InvestigationRequest::new("topic", 3, 2), None)
        .await;

    assert!(matches!(
        result,
        Err(InvestigationError::Generation(GenerationError::Provider(_)))
    ));
}

#[tokio::test]
async fn test_child_planning_failure_is_contained() {
    let generator = Arc::new(MockGenerator {
        fail_planning_from: Some(1),
        ..Default::default()
    });
    let engine = engine(generator, Arc::new(MockSearch::default()));

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 2, 2), None)
        .await
        .unwrap();

    assert!(outcome.is_empty());
    assert!(engine
        .log()
        .entries()
        .iter()
        .any(|e| e.contains("Error processing query")));
}

// =============================================================================
// Concurrency and progress
// =============================================================================

#[tokio::test]
async fn test_at_most_two_searches_in_flight_per_call() {
    let generator = Arc::new(MockGenerator::default());
    let search = Arc::new(MockSearch {
        delay: Duration::from_millis(30),
        ..Default::default()
    });
    let engine = engine(generator, search.clone());

    engine
        .conduct_investigation(InvestigationRequest::new("topic", 5, 1), None)
        .await
        .unwrap();

    assert_eq!(search.calls.load(Ordering::SeqCst), 5);
    assert!(search.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_progress_observer_sees_each_completion() {
    let generator = Arc::new(MockGenerator::default());
    let engine = engine(generator, Arc::new(MockSearch::default()));

    let snapshots = Arc::new(Mutex::new(Vec::<InvestigationProgress>::new()));
    let sink = snapshots.clone();
    let observer: Arc<dyn ProgressObserver> = Arc::new(move |p: &InvestigationProgress| {
        sink.lock().unwrap().push(p.clone());
    });

    engine
        .conduct_investigation(InvestigationRequest::new("topic", 2, 1), Some(observer))
        .await
        .unwrap();

    let snapshots = snapshots.lock().unwrap();
    assert_eq!(snapshots.len(), 3);

    let first = &snapshots[0];
    assert_eq!(first.total_inquiries, 2);
    assert_eq!(first.completed_inquiries, 0);
    assert_eq!(first.current_inquiry.as_deref(), Some("c0-q0"));

    let last = snapshots.last().unwrap();
    assert_eq!(last.completed_inquiries, 2);
    assert_eq!(last.current_level, 0);
    assert_eq!(last.total_levels, 1);
}

// =============================================================================
// Report
// =============================================================================

#[tokio::test]
async fn test_report_lists_every_explored_source() {
    let generator = Arc::new(MockGenerator::default());
    let engine = engine(generator.clone(), Arc::new(MockSearch::default()));

    let outcome = engine
        .conduct_investigation(InvestigationRequest::new("topic", 2, 1), None)
        .await
        .unwrap();
    let sources = outcome.explored_sources.clone();

    let budgeter = PromptBudgeter::new(Arc::new(ApproxTokenCounter::default()));
    let report = ReportSynthesizer::new(generator, budgeter, 128_000)
        .generate_analysis_report(&ReportInput::new("topic", outcome))
        .await
        .unwrap();

    assert!(report.starts_with("# Findings\n\nSummary.\n\n## Reference Sources\n\n"));
    for source in sources {
        assert!(report.contains(&format!("- {}", source)));
    }
}
