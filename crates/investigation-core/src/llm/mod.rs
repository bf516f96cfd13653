//! Structured generation
//!
//! Provides the seam between the investigation engine and an LLM:
//! - `StructuredGenerator`: returns a JSON object for a system prompt, a user
//!   prompt and a JSON schema
//! - `generate_object`: applies the request timeout and validates the object
//!   by deserializing it into the caller's type
//! - `RigGenerator`: implementation over rig-core agents (OpenAI, Ollama)

pub mod config;
pub mod provider;
pub mod rig_generator;

pub use config::LLMConfig;
pub use provider::{generate_object, GenerationRequest, ObjectSchema, StructuredGenerator};
pub use rig_generator::{RigBackend, RigGenerator};
