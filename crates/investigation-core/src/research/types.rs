//! Investigation data model

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Snapshot of expansion state for one `conduct_investigation` call.
///
/// Advisory only: concurrent branches overwrite fields, last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationProgress {
    pub current_level: usize,
    pub total_levels: usize,
    pub current_scope: usize,
    pub total_scope: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_inquiry: Option<String>,
    pub total_inquiries: usize,
    pub completed_inquiries: usize,
}

impl InvestigationProgress {
    /// Initial record: levels and scope both start at their totals
    pub fn new(exploration_depth: usize, expansion_width: usize) -> Self {
        Self {
            current_level: exploration_depth,
            total_levels: exploration_depth,
            current_scope: expansion_width,
            total_scope: expansion_width,
            current_inquiry: None,
            total_inquiries: 0,
            completed_inquiries: 0,
        }
    }

    /// Merge the set fields of `update` into this record
    pub fn apply(&mut self, update: ProgressUpdate) {
        if let Some(level) = update.current_level {
            self.current_level = level;
        }
        if let Some(scope) = update.current_scope {
            self.current_scope = scope;
        }
        if let Some(total) = update.total_inquiries {
            self.total_inquiries = total;
        }
        if update.complete_one {
            self.completed_inquiries += 1;
        }
        if let Some(inquiry) = update.current_inquiry {
            self.current_inquiry = inquiry;
        }
    }
}

/// Partial progress change; unset fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdate {
    pub current_level: Option<usize>,
    pub current_scope: Option<usize>,
    pub total_inquiries: Option<usize>,
    pub current_inquiry: Option<Option<String>>,
    pub complete_one: bool,
}

/// Observer for progress snapshots.
///
/// Any `Fn(&InvestigationProgress)` closure is an observer.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &InvestigationProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&InvestigationProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &InvestigationProgress) {
        self(progress)
    }
}

/// Accumulated insights and sources; each list is free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationOutcome {
    pub insights: Vec<String>,
    pub explored_sources: Vec<String>,
}

impl InvestigationOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty() && self.explored_sources.is_empty()
    }

    /// Set union of several outcomes, keeping first-seen order.
    pub fn merge<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = InvestigationOutcome>,
    {
        let mut insights = Vec::new();
        let mut explored_sources = Vec::new();
        let mut seen_insights = HashSet::new();
        let mut seen_sources = HashSet::new();

        for outcome in outcomes {
            for insight in outcome.insights {
                if seen_insights.insert(insight.clone()) {
                    insights.push(insight);
                }
            }
            for source in outcome.explored_sources {
                if seen_sources.insert(source.clone()) {
                    explored_sources.push(source);
                }
            }
        }

        Self {
            insights,
            explored_sources,
        }
    }
}

/// One planned search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryMetadata {
    pub inquiry: String,
    /// What the query is meant to discover; phrases the next-level query
    pub investigation_intent: String,
}

/// Digest of one query's search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedInsight {
    pub insights: Vec<String>,
    pub follow_up_inquiries: Vec<String>,
}

/// Input of the report synthesizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub initial_query: String,
    pub insights: Vec<String>,
    pub explored_sources: Vec<String>,
}

impl ReportInput {
    pub fn new(initial_query: impl Into<String>, outcome: InvestigationOutcome) -> Self {
        Self {
            initial_query: initial_query.into(),
            insights: outcome.insights,
            explored_sources: outcome.explored_sources,
        }
    }
}
