//! Query planning
//!
//! Asks the structured generator for search queries and caps the result at
//! the requested count, whatever the model returned.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::prompts::InvestigationPrompts;
use super::types::SearchQueryMetadata;
use crate::error::GenerationError;
use crate::llm::{generate_object, GenerationRequest, ObjectSchema, StructuredGenerator};

/// Queries planned when the caller does not say otherwise
pub const DEFAULT_QUERY_COUNT: usize = 3;

#[derive(Debug, Deserialize)]
struct QueryPlan {
    queries: Vec<SearchQueryMetadata>,
}

pub struct QueryPlanner {
    generator: Arc<dyn StructuredGenerator>,
}

impl QueryPlanner {
    pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self { generator }
    }

    /// Plan at most `query_count` queries for `inquiry`.
    ///
    /// Generation failures are returned as-is; nothing is retried.
    pub async fn generate_search_queries(
        &self,
        inquiry: &str,
        query_count: usize,
        previous_insights: &[String],
    ) -> Result<Vec<SearchQueryMetadata>, GenerationError> {
        let request = GenerationRequest::new(
            InvestigationPrompts::system(),
            InvestigationPrompts::planner(inquiry, query_count, previous_insights),
            Self::schema(query_count),
        );

        let plan: QueryPlan = generate_object(self.generator.as_ref(), &request).await?;
        let mut queries = plan.queries;
        queries.truncate(query_count);

        debug!(count = queries.len(), requested = query_count, "Planned search queries");
        Ok(queries)
    }

    fn schema(query_count: usize) -> ObjectSchema {
        ObjectSchema::new(
            "research_queries",
            format!("Collection of search queries, maximum {}", query_count),
            json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "type": "array",
                        "description": format!("Collection of search queries, maximum {}", query_count),
                        "items": {
                            "type": "object",
                            "properties": {
                                "inquiry": {
                                    "type": "string",
                                    "description": "The search inquiry"
                                },
                                "investigationIntent": {
                                    "type": "string",
                                    "description": "Elaborate on the investigation purpose and potential research directions. Detail specific aspects to explore and potential connections to uncover."
                                }
                            },
                            "required": ["inquiry", "investigationIntent"]
                        }
                    }
                },
                "required": ["queries"]
            }),
        )
    }
}
