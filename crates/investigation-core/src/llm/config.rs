//! LLM configuration types

use serde::{Deserialize, Serialize};

/// Model selection and sampling settings for a generator.
///
/// # Example
///
/// ```
/// use investigation_core::llm::LLMConfig;
///
/// let config = LLMConfig::new("o3-mini").with_temperature(0.2);
///
/// assert_eq!(config.model, "o3-mini");
/// assert_eq!(config.temperature, Some(0.2));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Model identifier (e.g., "o3-mini", "llama3.2")
    pub model: String,
    /// Sampling temperature (0.0 - 2.0). Left unset for reasoning models,
    /// which reject it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl LLMConfig {
    /// Create a new configuration with the specified model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }
}
