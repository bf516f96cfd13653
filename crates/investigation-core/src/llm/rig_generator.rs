//! rig-core backed structured generator
//!
//! Builds a one-shot Rig agent per request. The JSON schema is appended to
//! the preamble and the object is extracted from the model's reply.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::{ollama, openai};
use serde_json::Value;
use tracing::debug;

use super::config::LLMConfig;
use super::provider::{extract_json_object, GenerationRequest, ObjectSchema, StructuredGenerator};
use crate::error::GenerationError;

/// Rig client the generator talks to
pub enum RigBackend {
    OpenAi(openai::Client),
    Ollama(ollama::Client),
}

impl RigBackend {
    fn name(&self) -> &'static str {
        match self {
            RigBackend::OpenAi(_) => "openai",
            RigBackend::Ollama(_) => "ollama",
        }
    }
}

/// Structured generator over a Rig provider client
///
/// # Example
///
/// ```rust,ignore
/// use investigation_core::llm::{LLMConfig, RigGenerator};
///
/// // Reads OPENAI_API_KEY (and OPENAI_BASE_URL if set)
/// let generator = RigGenerator::openai_from_env(LLMConfig::new("o3-mini"));
/// ```
pub struct RigGenerator {
    backend: RigBackend,
    config: LLMConfig,
}

impl RigGenerator {
    pub fn new(backend: RigBackend, config: LLMConfig) -> Self {
        Self { backend, config }
    }

    /// OpenAI client from OPENAI_API_KEY / OPENAI_BASE_URL
    pub fn openai_from_env(config: LLMConfig) -> Self {
        Self::new(RigBackend::OpenAi(openai::Client::from_env()), config)
    }

    /// OpenAI client with an explicit API key
    pub fn openai(api_key: impl Into<String>, config: LLMConfig) -> Self {
        let api_key: String = api_key.into();
        Self::new(RigBackend::OpenAi(openai::Client::from_val(api_key.into())), config)
    }

    /// Ollama client from OLLAMA_API_BASE_URL (default http://localhost:11434)
    pub fn ollama_from_env(config: LLMConfig) -> Self {
        Self::new(RigBackend::Ollama(ollama::Client::from_env()), config)
    }

    fn preamble(request: &GenerationRequest) -> String {
        format!("{}\n\n{}", request.system, schema_instructions(&request.schema))
    }
}

#[async_trait]
impl StructuredGenerator for RigGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let preamble = Self::preamble(request);
        let model = self.config.model.as_str();

        debug!(
            provider = self.backend.name(),
            model = %model,
            schema = %request.schema.name,
            "Requesting structured generation"
        );

        let response = match &self.backend {
            RigBackend::OpenAi(client) => {
                let mut builder = client.agent(model).preamble(&preamble);
                if let Some(temp) = self.config.temperature {
                    builder = builder.temperature(temp);
                }
                let agent = builder.build();
                let response = agent.prompt(&request.prompt).await;
                response
            }
            RigBackend::Ollama(client) => {
                let mut builder = client.agent(model).preamble(&preamble);
                if let Some(temp) = self.config.temperature {
                    builder = builder.temperature(temp);
                }
                let agent = builder.build();
                let response = agent.prompt(&request.prompt).await;
                response
            }
        }
        .map_err(|e| {
            GenerationError::Provider(format!("{} completion failed: {}", self.backend.name(), e))
        })?;

        extract_json_object(&response)
    }

    fn name(&self) -> &str {
        self.backend.name()
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn schema_instructions(schema: &ObjectSchema) -> String {
    let rendered =
        serde_json::to_string_pretty(&schema.schema).unwrap_or_else(|_| schema.schema.to_string());
    format!(
        "Respond with a single JSON object `{}` ({}) that validates against the JSON Schema \
         below. Output only the JSON object, with no commentary.\n\n{}",
        schema.name, schema.description, rendered
    )
}
