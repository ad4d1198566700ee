//! Question classification using an LLM.
//!
//! The `Classifier` asks the model to name exactly one handler label and validates the
//! answer against the closed set of `RoutingDecision`s.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::LanguageModel;
use crate::models::{Request, RouteError, RoutingDecision};

/// Prompt template for handler selection.
const PROMPT_TEMPLATE: &str = "Question: {question}
Choose the most appropriate agent for this question. Return only one of the following exact options:
- retrieve_internal
- fetch_air_quality
- visualize_data
Do not provide any explanation, just return the exact name of the option.";

/// Maps a question to one of the three handlers.
pub struct Classifier {
    model: Arc<dyn LanguageModel>,
}

impl Classifier {
    /// Creates a classifier backed by the given model.
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Classifies a request.
    ///
    /// Makes one model call. A failed call or an answer that is not exactly one of the
    /// known labels fails the request; there is no fallback label.
    pub fn classify(&self, request: &Request) -> Result<RoutingDecision, RouteError> {
        let prompt = build_prompt(request.question());
        let response = self.model.invoke(&prompt)?;

        let Some(text) = response.text() else {
            warn!(%response, "classifier response has no text payload");
            return Err(RouteError::InvalidRouting(response.to_string()));
        };

        let label = normalize_label(text);
        debug!(raw = %text, %label, "classifier answered");

        RoutingDecision::from_label(&label).ok_or(RouteError::InvalidRouting(label))
    }
}

fn build_prompt(question: &str) -> String {
    PROMPT_TEMPLATE.replace("{question}", question)
}

/// Trims the answer and unescapes markdown-escaped underscores (`retrieve\_internal`).
fn normalize_label(raw: &str) -> String {
    raw.trim().replace("\\_", "_")
}
