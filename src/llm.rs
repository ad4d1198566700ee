/// Language-model client module.
///
/// This module provides the `LanguageModel` seam used by the classifier and handlers,
/// the typed `ModelResponse` they read from, and a blocking Ollama HTTP client.
mod client;
mod response;

pub use client::{LanguageModel, LlmError, OllamaClient, OllamaClientBuilder};
pub use response::ModelResponse;
