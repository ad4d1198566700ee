/// Ollama HTTP client implementation.
///
/// This module provides `OllamaClient` for making synchronous HTTP requests to the Ollama API,
/// along with error types and the builder used for configuration.
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::response::ModelResponse;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors that can occur when invoking a language model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl LlmError {
    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Builder for constructing `OllamaClient` instances.
///
/// # Examples
///
/// ```
/// use ecoroute::llm::OllamaClientBuilder;
///
/// let client = OllamaClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .model("mistral")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "mistral");
/// ```
#[derive(Debug, Default)]
pub struct OllamaClientBuilder {
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl OllamaClientBuilder {
    /// Creates a new `OllamaClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Ollama API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model name sent with every request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `OllamaClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, this method will check the `OLLAMA_HOST`
    /// environment variable. If not set, it defaults to `http://localhost:11434`.
    ///
    /// If `model()` was not called, this method will check the `OLLAMA_MODEL`
    /// environment variable. If not set, it defaults to an empty string.
    pub fn build(self) -> Result<OllamaClient, LlmError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };

        let model = match self.model {
            Some(m) => m,
            None => std::env::var("OLLAMA_MODEL").unwrap_or_default(),
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| LlmError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            )
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(LlmError::Network)?;

        Ok(OllamaClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

/// A language-model inference endpoint.
///
/// Implemented by `OllamaClient` and by test doubles. Every call is a single attempt.
pub trait LanguageModel: Send + Sync {
    /// Sends `prompt` to the model and returns its response.
    fn invoke(&self, prompt: &str) -> Result<ModelResponse, LlmError>;
}

/// Synchronous HTTP client for the Ollama API.
///
/// It should be constructed using `OllamaClientBuilder`.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists available models from the Ollama API, sorted by size (largest first).
    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(LlmError::from_transport)?;

        if !response.status().is_success() {
            return Err(LlmError::Http {
                status: response.status().as_u16(),
            });
        }

        let json: serde_json::Value = response.json().map_err(LlmError::Network)?;

        let mut models: Vec<(String, u64)> = json
            .get("models")
            .and_then(|m| m.as_array())
            .map(|models| {
                models
                    .iter()
                    .filter_map(|model| {
                        let name = model.get("name").and_then(|n| n.as_str())?;
                        let size = model.get("size").and_then(|s| s.as_u64()).unwrap_or(0);
                        Some((name.to_string(), size))
                    })
                    .collect()
            })
            .unwrap_or_default();

        models.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(models.into_iter().map(|(name, _)| name).collect())
    }
}

impl LanguageModel for OllamaClient {
    fn invoke(&self, prompt: &str) -> Result<ModelResponse, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let request_body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "invoking language model");

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(LlmError::from_transport)?;
        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(LlmError::Serialization)?;

        Ok(ModelResponse::from_json(json))
    }
}
