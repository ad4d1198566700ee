//! Answers questions from the ingested documents.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::LanguageModel;
use crate::models::{HandlerResult, Request};
use crate::retriever::{Document, Retriever};

use super::Handler;

/// Number of top-ranked passages placed in the prompt.
pub const MAX_CONTEXT_DOCUMENTS: usize = 3;

const NO_DOCUMENTS: &str = "No relevant documents found.";
const FORMAT_ERROR: &str = "Error formatting the response.";

/// Prompt template for the structured document answer.
const PROMPT_TEMPLATE: &str = "Analyze the following documents and answer the question in a structured way.
Documents:
{context}
Question: {question}
Expected format:
1. Summary
2. Key Points
3. Recommendations";

/// Retrieves passages and asks the model for a structured answer.
pub struct DocumentHandler {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn LanguageModel>,
}

impl DocumentHandler {
    #[must_use]
    pub fn new(retriever: Arc<dyn Retriever>, model: Arc<dyn LanguageModel>) -> Self {
        Self { retriever, model }
    }
}

impl Handler for DocumentHandler {
    fn run(&self, request: &Request) -> HandlerResult {
        let question = request.question();

        let documents = match self.retriever.query(question) {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "document retrieval failed");
                return HandlerResult::text(format!("Error retrieving documents: {e}"));
            }
        };

        if documents.is_empty() {
            return HandlerResult::text(NO_DOCUMENTS);
        }

        let selected = &documents[..documents.len().min(MAX_CONTEXT_DOCUMENTS)];
        debug!(retrieved = documents.len(), used = selected.len(), "building document prompt");

        let prompt = PROMPT_TEMPLATE
            .replace("{context}", &format_context(selected))
            .replace("{question}", question);

        match self.model.invoke(&prompt) {
            Ok(response) => match response.text() {
                Some(text) => HandlerResult::text(text.trim()),
                None => {
                    warn!(%response, "document answer has no text payload");
                    HandlerResult::text(FORMAT_ERROR)
                }
            },
            Err(e) => {
                warn!(error = %e, "document answer generation failed");
                HandlerResult::text(format!("Error generating the answer: {e}"))
            }
        }
    }
}

/// Joins passage texts with blank lines.
fn format_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(Document::content)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, ModelResponse};
    use crate::retriever::RetrieverError;
    use std::sync::Mutex;

    struct FixedRetriever {
        documents: Vec<Document>,
    }

    impl Retriever for FixedRetriever {
        fn query(&self, _text: &str) -> Result<Vec<Document>, RetrieverError> {
            Ok(self.documents.clone())
        }
    }

    struct BrokenRetriever;

    impl Retriever for BrokenRetriever {
        fn query(&self, _text: &str) -> Result<Vec<Document>, RetrieverError> {
            Err(RetrieverError::Poisoned)
        }
    }

    struct RecordingModel {
        response: Result<ModelResponse, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingModel {
        fn new(response: Result<ModelResponse, u16>) -> Arc<Self> {
            Arc::new(Self {
                response,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl LanguageModel for RecordingModel {
        fn invoke(&self, prompt: &str) -> Result<ModelResponse, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response
                .clone()
                .map_err(|status| LlmError::Http { status })
        }
    }

    fn docs(n: usize) -> Vec<Document> {
        (1..=n).map(|i| Document::new(format!("passage {i}"))).collect()
    }

    fn request() -> Request {
        Request::new("What are the key decarbonisation levers?").unwrap()
    }

    #[test]
    fn empty_retrieval_short_circuits_without_model_call() {
        let model = RecordingModel::new(Ok("unused".into()));
        let handler = DocumentHandler::new(
            Arc::new(FixedRetriever { documents: vec![] }),
            model.clone(),
        );

        let result = handler.run(&request());

        assert_eq!(result.message(), "No relevant documents found.");
        assert!(result.chart().is_none());
        assert!(model.prompts().is_empty());
    }

    #[test]
    fn only_top_three_documents_reach_the_prompt() {
        let model = RecordingModel::new(Ok("answer".into()));
        let handler = DocumentHandler::new(Arc::new(FixedRetriever { documents: docs(5) }), model.clone());

        handler.run(&request());

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("passage 1\n\npassage 2\n\npassage 3\n"));
        assert!(!prompts[0].contains("passage 4"));
        assert!(!prompts[0].contains("passage 5"));
    }

    #[test]
    fn prompt_follows_structured_template() {
        let model = RecordingModel::new(Ok("answer".into()));
        let handler = DocumentHandler::new(Arc::new(FixedRetriever { documents: docs(1) }), model.clone());

        handler.run(&request());

        assert_eq!(
            model.prompts()[0],
            "Analyze the following documents and answer the question in a structured way.\n\
             Documents:\n\
             passage 1\n\
             Question: What are the key decarbonisation levers?\n\
             Expected format:\n\
             1. Summary\n\
             2. Key Points\n\
             3. Recommendations"
        );
    }

    #[test]
    fn structured_response_is_trimmed() {
        let model = RecordingModel::new(Ok(ModelResponse::Structured {
            text: "\n1. Summary\nUse less energy.\n  ".to_string(),
        }));
        let handler = DocumentHandler::new(Arc::new(FixedRetriever { documents: docs(2) }), model);

        assert_eq!(handler.run(&request()).message(), "1. Summary\nUse less energy.");
    }

    #[test]
    fn plain_text_response_is_trimmed() {
        let model = RecordingModel::new(Ok(ModelResponse::PlainText("  plain answer ".to_string())));
        let handler = DocumentHandler::new(Arc::new(FixedRetriever { documents: docs(2) }), model);

        assert_eq!(handler.run(&request()).message(), "plain answer");
    }

    #[test]
    fn unrecognized_response_is_reported_as_text() {
        let model = RecordingModel::new(Ok(ModelResponse::Unrecognized(serde_json::json!([1, 2]))));
        let handler = DocumentHandler::new(Arc::new(FixedRetriever { documents: docs(2) }), model);

        assert_eq!(
            handler.run(&request()).message(),
            "Error formatting the response."
        );
    }

    #[test]
    fn model_failure_is_recovered_locally() {
        let model = RecordingModel::new(Err(503));
        let handler = DocumentHandler::new(Arc::new(FixedRetriever { documents: docs(2) }), model);

        let result = handler.run(&request());
        assert_eq!(
            result.message(),
            "Error generating the answer: HTTP error: status 503"
        );
    }

    #[test]
    fn retriever_failure_is_recovered_locally() {
        let model = RecordingModel::new(Ok("unused".into()));
        let handler = DocumentHandler::new(Arc::new(BrokenRetriever), model.clone());

        let result = handler.run(&request());

        assert!(result.message().starts_with("Error retrieving documents:"));
        assert!(model.prompts().is_empty());
    }
}
