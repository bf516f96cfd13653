//! Recursive investigation engine
//!
//! Each `conduct_investigation` call is one node of the investigation tree:
//!
//! ```text
//! plan ≤ width queries
//!   └─ per query (at most `concurrency_limit` in flight):
//!        search ─► digest ─► depth left? ─ yes ─► recurse(width/2↑, depth-1)
//!                                         └ no ──► merged insights + sources
//! union of all branches (exact dedup)
//! ```
//!
//! A failing branch contributes an empty outcome; only planning failure of
//! the node itself is returned as an error.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt};
use tracing::{debug, info};

use super::digester::ResultDigester;
use super::planner::QueryPlanner;
use super::types::{
    InvestigationOutcome, InvestigationProgress, ProgressObserver, ProgressUpdate,
    SearchQueryMetadata,
};
use crate::budget::PromptBudgeter;
use crate::config::EngineSettings;
use crate::error::{InvestigationError, SearchError};
use crate::llm::StructuredGenerator;
use crate::log_buffer::InvestigationLog;
use crate::search::{SearchProvider, SearchResponse};

/// Arguments of one `conduct_investigation` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestigationRequest {
    pub query: String,
    /// Queries planned at this level
    pub expansion_width: usize,
    /// Levels left, this one included
    pub exploration_depth: usize,
    /// Insights gathered on the way here
    pub insights: Vec<String>,
    pub explored_sources: Vec<String>,
}

impl InvestigationRequest {
    pub fn new(query: impl Into<String>, expansion_width: usize, exploration_depth: usize) -> Self {
        Self {
            query: query.into(),
            expansion_width,
            exploration_depth,
            ..Default::default()
        }
    }

    pub fn with_insights(mut self, insights: Vec<String>) -> Self {
        self.insights = insights;
        self
    }

    pub fn with_explored_sources(mut self, sources: Vec<String>) -> Self {
        self.explored_sources = sources;
        self
    }
}

/// Per-call progress record plus the observer it is pushed to
struct ProgressTracker {
    state: Mutex<InvestigationProgress>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ProgressTracker {
    fn new(request: &InvestigationRequest, observer: Option<Arc<dyn ProgressObserver>>) -> Self {
        Self {
            state: Mutex::new(InvestigationProgress::new(
                request.exploration_depth,
                request.expansion_width,
            )),
            observer,
        }
    }

    fn update(&self, update: ProgressUpdate) {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.apply(update);
            state.clone()
        };
        if let Some(observer) = &self.observer {
            observer.on_progress(&snapshot);
        }
    }
}

/// Breadth/depth-bounded recursive investigation.
///
/// # Example
///
/// ```rust,ignore
/// let engine = InvestigationEngine::new(generator, search, budgeter, EngineSettings::default());
/// let outcome = engine
///     .conduct_investigation(InvestigationRequest::new("solid-state batteries", 3, 2), None)
///     .await?;
/// ```
pub struct InvestigationEngine {
    planner: QueryPlanner,
    digester: ResultDigester,
    search: Arc<dyn SearchProvider>,
    settings: EngineSettings,
    log: Arc<InvestigationLog>,
}

impl InvestigationEngine {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        search: Arc<dyn SearchProvider>,
        budgeter: PromptBudgeter,
        settings: EngineSettings,
    ) -> Self {
        let digester = ResultDigester::new(generator.clone(), budgeter)
            .with_segment_token_budget(settings.digest_token_budget)
            .with_timeout(settings.digest_timeout);

        Self {
            planner: QueryPlanner::new(generator),
            digester,
            search,
            settings,
            log: Arc::new(InvestigationLog::new()),
        }
    }

    /// Share an existing log instead of the engine's own
    pub fn with_log(mut self, log: Arc<InvestigationLog>) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> &Arc<InvestigationLog> {
        &self.log
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Investigate `request.query`, recursing on follow-up questions until
    /// the depth is spent.
    ///
    /// Returns the union of every branch's insights and sources. Fails only
    /// when this call's own query planning fails.
    pub fn conduct_investigation<'a>(
        &'a self,
        request: InvestigationRequest,
        observer: Option<Arc<dyn ProgressObserver>>,
    ) -> BoxFuture<'a, Result<InvestigationOutcome, InvestigationError>> {
        async move {
            debug!(
                width = request.expansion_width,
                depth = request.exploration_depth,
                "Investigation level started"
            );

            let tracker = ProgressTracker::new(&request, observer);

            let queries = self
                .planner
                .generate_search_queries(&request.query, request.expansion_width, &request.insights)
                .await?;

            tracker.update(ProgressUpdate {
                total_inquiries: Some(queries.len()),
                current_inquiry: Some(queries.first().map(|q| q.inquiry.clone())),
                ..Default::default()
            });

            let request = &request;
            let tracker = &tracker;
            let outcomes: Vec<InvestigationOutcome> = stream::iter(queries)
                .map(move |query| self.explore_branch(query, request, tracker))
                .buffer_unordered(self.settings.concurrency_limit.max(1))
                .collect()
                .await;

            Ok(InvestigationOutcome::merge(outcomes))
        }
        .boxed()
    }

    /// One planned query's subtree; failures become an empty outcome.
    async fn explore_branch(
        &self,
        query: SearchQueryMetadata,
        parent: &InvestigationRequest,
        tracker: &ProgressTracker,
    ) -> InvestigationOutcome {
        match self.try_explore_branch(&query, parent, tracker).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_timeout() => {
                self.log
                    .warn(format!("Timeout encountered for query: {}: {}", query.inquiry, e));
                InvestigationOutcome::empty()
            }
            Err(e) => {
                self.log
                    .error(format!("Error processing query: {}: {}", query.inquiry, e));
                InvestigationOutcome::empty()
            }
        }
    }

    async fn try_explore_branch(
        &self,
        query: &SearchQueryMetadata,
        parent: &InvestigationRequest,
        tracker: &ProgressTracker,
    ) -> Result<InvestigationOutcome, InvestigationError> {
        let search = self.search_with_timeout(&query.inquiry).await?;
        let discovered_sources = search.urls();

        let child_width = parent.expansion_width.div_ceil(2);
        let child_depth = parent.exploration_depth.saturating_sub(1);

        let digest = self
            .digester
            .process_search_results(
                &query.inquiry,
                &search,
                self.settings.insight_limit,
                child_width,
            )
            .await?;

        let insights: Vec<String> = parent.insights.iter().cloned().chain(digest.insights).collect();
        let explored_sources: Vec<String> = parent
            .explored_sources
            .iter()
            .cloned()
            .chain(discovered_sources)
            .collect();

        if child_depth > 0 {
            self.log.record(format!(
                "Deepening investigation, width: {}, depth: {}",
                child_width, child_depth
            ));

            tracker.update(ProgressUpdate {
                current_level: Some(child_depth),
                current_scope: Some(child_width),
                current_inquiry: Some(Some(query.inquiry.clone())),
                complete_one: true,
                ..Default::default()
            });

            let next = InvestigationRequest::new(
                next_inquiry(&query.investigation_intent, &digest.follow_up_inquiries),
                child_width,
                child_depth,
            )
            .with_insights(insights)
            .with_explored_sources(explored_sources);

            self.conduct_investigation(next, tracker.observer.clone()).await
        } else {
            tracker.update(ProgressUpdate {
                current_level: Some(0),
                current_inquiry: Some(Some(query.inquiry.clone())),
                complete_one: true,
                ..Default::default()
            });

            info!(
                query = %query.inquiry,
                insights = insights.len(),
                sources = explored_sources.len(),
                "Branch reached maximum depth"
            );

            Ok(InvestigationOutcome {
                insights,
                explored_sources,
            })
        }
    }

    async fn search_with_timeout(&self, inquiry: &str) -> Result<SearchResponse, SearchError> {
        let options = self.settings.search_options();
        tokio::time::timeout(options.timeout, self.search.search(inquiry, &options))
            .await
            .map_err(|_| SearchError::Timeout)?
    }
}

/// Query for the next level: the parent's intent plus one follow-up per line.
fn next_inquiry(investigation_intent: &str, follow_ups: &[String]) -> String {
    let directions: String = follow_ups.iter().map(|q| format!("\n{}", q)).collect();
    format!(
        "Previous investigation goal: {}\nAdditional research directions: {}",
        investigation_intent, directions
    )
    .trim()
    .to_string()
}
