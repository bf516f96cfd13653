//! Structured generator trait definition

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GenerationError;

/// JSON schema the generated object must satisfy
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    /// Short identifier, used in errors and logs
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl ObjectSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// One structured-generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub schema: ObjectSchema,
    /// Abort the call after this long
    pub timeout: Option<Duration>,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, schema: ObjectSchema) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            schema,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Structured-generation provider
///
/// Implementations return the raw JSON object; validation against the
/// caller's type happens in [`generate_object`].
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct Canned(serde_json::Value);
///
/// #[async_trait]
/// impl StructuredGenerator for Canned {
///     async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
///         Ok(self.0.clone())
///     }
///
///     fn name(&self) -> &str { "canned" }
///     fn model(&self) -> &str { "none" }
/// }
/// ```
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;

    /// Provider name for logging/debugging
    fn name(&self) -> &str;

    /// Model identifier used for generation
    fn model(&self) -> &str;
}

/// Run `request` and validate the result as a `T`.
///
/// A missing or mistyped field is a `SchemaViolation`; exceeding
/// `request.timeout` is a `Timeout`.
pub async fn generate_object<T: DeserializeOwned>(
    generator: &dyn StructuredGenerator,
    request: &GenerationRequest,
) -> Result<T, GenerationError> {
    let value = match request.timeout {
        Some(limit) => tokio::time::timeout(limit, generator.generate(request))
            .await
            .map_err(|_| GenerationError::Timeout(limit))??,
        None => generator.generate(request).await?,
    };

    serde_json::from_value(value).map_err(|e| GenerationError::SchemaViolation {
        schema: request.schema.name.clone(),
        message: e.to_string(),
    })
}

/// Pull the JSON object out of a free-text model reply.
///
/// Tolerates surrounding prose and markdown code fences.
pub fn extract_json_object(text: &str) -> Result<Value, GenerationError> {
    let start = text
        .find('{')
        .ok_or_else(|| GenerationError::MalformedResponse("no JSON object in response".into()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| GenerationError::MalformedResponse("unterminated JSON object".into()))?;

    let value: Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(GenerationError::MalformedResponse("response is not a JSON object".into()))
    }
}
