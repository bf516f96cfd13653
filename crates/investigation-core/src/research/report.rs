//! Final report synthesis

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::prompts::InvestigationPrompts;
use super::types::ReportInput;
use crate::budget::PromptBudgeter;
use crate::error::InvestigationError;
use crate::llm::{generate_object, GenerationRequest, ObjectSchema, StructuredGenerator};

/// Heading of the appended source list
pub const REFERENCE_SECTION_HEADING: &str = "## Reference Sources";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    report_markdown: String,
}

pub struct ReportSynthesizer {
    generator: Arc<dyn StructuredGenerator>,
    budgeter: PromptBudgeter,
    context_size: usize,
}

impl ReportSynthesizer {
    /// `context_size` bounds the tokens spent on the insight block.
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        budgeter: PromptBudgeter,
        context_size: usize,
    ) -> Self {
        Self {
            generator,
            budgeter,
            context_size,
        }
    }

    /// Write the markdown report for `input`.
    ///
    /// Every explored source is listed under "Reference Sources", cited in
    /// the body or not. Generation failures are returned unchanged.
    pub async fn generate_analysis_report(
        &self,
        input: &ReportInput,
    ) -> Result<String, InvestigationError> {
        let insights_block = input
            .insights
            .iter()
            .map(|insight| format!("<insight>\n{}\n</insight>", insight))
            .collect::<Vec<_>>()
            .join("\n");
        let insights_block = self
            .budgeter
            .optimize_prompt_length(&insights_block, self.context_size);

        info!(
            insights = input.insights.len(),
            sources = input.explored_sources.len(),
            "Synthesizing analysis report"
        );

        let request = GenerationRequest::new(
            InvestigationPrompts::system(),
            InvestigationPrompts::report(&input.initial_query, &insights_block),
            ObjectSchema::new(
                "analysis_report",
                "Comprehensive analysis report",
                json!({
                    "type": "object",
                    "properties": {
                        "reportMarkdown": {
                            "type": "string",
                            "description": "Comprehensive analysis report in Markdown format"
                        }
                    },
                    "required": ["reportMarkdown"]
                }),
            ),
        );

        let response: ReportResponse = generate_object(self.generator.as_ref(), &request).await?;

        Ok(format!(
            "{}{}",
            response.report_markdown,
            reference_section(&input.explored_sources)
        ))
    }
}

fn reference_section(sources: &[String]) -> String {
    let bullets = sources
        .iter()
        .map(|source| format!("- {}", source))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n{}\n\n{}", REFERENCE_SECTION_HEADING, bullets)
}
