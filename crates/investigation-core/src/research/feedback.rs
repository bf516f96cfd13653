//! Feedback analysis on a finished report

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use super::prompts::InvestigationPrompts;
use crate::error::GenerationError;
use crate::llm::{generate_object, GenerationRequest, ObjectSchema, StructuredGenerator};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackResponse {
    analysis: String,
    actionable_steps: Vec<String>,
}

pub struct FeedbackAnalyzer {
    generator: Arc<dyn StructuredGenerator>,
}

impl FeedbackAnalyzer {
    pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self { generator }
    }

    /// Analyze `feedback` against `context` (usually the report).
    ///
    /// Returns an "Analysis:" paragraph followed by numbered actionable
    /// steps.
    pub async fn process_feedback(
        &self,
        feedback: &str,
        context: &str,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest::new(
            InvestigationPrompts::system(),
            InvestigationPrompts::feedback(feedback, context),
            ObjectSchema::new(
                "feedback_analysis",
                "Analysis of reader feedback with actionable steps",
                json!({
                    "type": "object",
                    "properties": {
                        "analysis": {
                            "type": "string",
                            "description": "Analysis of the feedback and suggested improvements"
                        },
                        "actionableSteps": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "List of specific actions to implement the improvements"
                        }
                    },
                    "required": ["analysis", "actionableSteps"]
                }),
            ),
        );

        let response: FeedbackResponse = generate_object(self.generator.as_ref(), &request).await?;

        let steps = response
            .actionable_steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!("Analysis:\n{}\n\nActionable Steps:\n{}", response.analysis, steps)
            .trim()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Fixed(Value);

    #[async_trait]
    impl StructuredGenerator for Fixed {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-model"
        }
    }

    #[tokio::test]
    async fn test_formats_numbered_steps() {
        let analyzer = FeedbackAnalyzer::new(Arc::new(Fixed(json!({
            "analysis": "The report lacks cost data.",
            "actionableSteps": ["Add a cost table", "Cite 2024 prices"]
        }))));

        let text = analyzer.process_feedback("Needs costs", "# Report").await.unwrap();

        assert_eq!(
            text,
            "Analysis:\nThe report lacks cost data.\n\nActionable Steps:\n1. Add a cost table\n2. Cite 2024 prices"
        );
    }

    #[tokio::test]
    async fn test_missing_steps_is_rejected() {
        let analyzer = FeedbackAnalyzer::new(Arc::new(Fixed(json!({"analysis": "ok"}))));

        let result = analyzer.process_feedback("f", "c").await;

        assert!(matches!(result, Err(GenerationError::SchemaViolation { .. })));
    }
}
