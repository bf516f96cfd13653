//! Result digestion
//!
//! Turns one query's scraped pages into a handful of insights and follow-up
//! questions. Each page is budgeted before it reaches the prompt.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::prompts::InvestigationPrompts;
use super::types::ProcessedInsight;
use crate::budget::PromptBudgeter;
use crate::error::GenerationError;
use crate::llm::{generate_object, GenerationRequest, ObjectSchema, StructuredGenerator};
use crate::search::SearchResponse;

/// Token budget for each scraped page
pub const DEFAULT_SEGMENT_TOKEN_BUDGET: usize = 25_000;

/// Timeout for one digest generation
pub const DEFAULT_DIGEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DigestResponse {
    insights: Vec<String>,
    follow_up_inquiries: Vec<String>,
}

pub struct ResultDigester {
    generator: Arc<dyn StructuredGenerator>,
    budgeter: PromptBudgeter,
    segment_token_budget: usize,
    timeout: Duration,
}

impl ResultDigester {
    pub fn new(generator: Arc<dyn StructuredGenerator>, budgeter: PromptBudgeter) -> Self {
        Self {
            generator,
            budgeter,
            segment_token_budget: DEFAULT_SEGMENT_TOKEN_BUDGET,
            timeout: DEFAULT_DIGEST_TIMEOUT,
        }
    }

    pub fn with_segment_token_budget(mut self, budget: usize) -> Self {
        self.segment_token_budget = budget;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Digest `search` for `inquiry`.
    ///
    /// Items without markdown are skipped. Both returned lists are cut to
    /// their limits. Timeouts and generation errors are returned to the
    /// caller, which decides whether the branch survives.
    pub async fn process_search_results(
        &self,
        inquiry: &str,
        search: &SearchResponse,
        insight_limit: usize,
        follow_up_limit: usize,
    ) -> Result<ProcessedInsight, GenerationError> {
        let segments: Vec<String> = search
            .markdown_contents()
            .into_iter()
            .map(|content| {
                self.budgeter
                    .optimize_prompt_length(content, self.segment_token_budget)
            })
            .collect();

        debug!(inquiry = %inquiry, segments = segments.len(), "Digesting search results");

        let request = GenerationRequest::new(
            InvestigationPrompts::system(),
            InvestigationPrompts::digest(inquiry, &segments),
            Self::schema(insight_limit, follow_up_limit),
        )
        .with_timeout(self.timeout);

        let response: DigestResponse = generate_object(self.generator.as_ref(), &request).await?;

        let mut insights = response.insights;
        insights.truncate(insight_limit);
        let mut follow_up_inquiries = response.follow_up_inquiries;
        follow_up_inquiries.truncate(follow_up_limit);

        Ok(ProcessedInsight {
            insights,
            follow_up_inquiries,
        })
    }

    fn schema(insight_limit: usize, follow_up_limit: usize) -> ObjectSchema {
        ObjectSchema::new(
            "search_digest",
            "Key insights and follow-up questions for one search",
            json!({
                "type": "object",
                "properties": {
                    "insights": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": format!("Key insights extracted, maximum {}", insight_limit)
                    },
                    "followUpInquiries": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": format!(
                            "Strategic follow-up questions for deeper investigation, maximum {}",
                            follow_up_limit
                        )
                    }
                },
                "required": ["insights", "followUpInquiries"]
            }),
        )
    }
}
