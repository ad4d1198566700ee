use std::sync::Arc;

use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::handlers::Handler;
use crate::llm::LanguageModel;
use crate::models::{HandlerResult, Request, RouteError, Routed, RoutingDecision};

/// Routes a question to exactly one handler.
///
/// The dispatcher is the single entry point for the CLI and TUI. It classifies the
/// question once, then runs the handler for that decision and returns its result. It
/// holds no per-request state, so one instance can serve any number of questions.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ecoroute::{Dispatcher, HandlerResult, Request};
/// use ecoroute::handlers::Handler;
/// use ecoroute::llm::{LanguageModel, LlmError, ModelResponse};
///
/// struct Fixed;
/// impl LanguageModel for Fixed {
///     fn invoke(&self, _prompt: &str) -> Result<ModelResponse, LlmError> {
///         Ok("visualize_data".into())
///     }
/// }
///
/// struct Echo(&'static str);
/// impl Handler for Echo {
///     fn run(&self, _request: &Request) -> HandlerResult {
///         HandlerResult::text(self.0)
///     }
/// }
///
/// let dispatcher = Dispatcher::builder(Arc::new(Fixed))
///     .document_handler(Arc::new(Echo("docs")))
///     .air_quality_handler(Arc::new(Echo("air")))
///     .visualization_handler(Arc::new(Echo("map")))
///     .build()
///     .unwrap();
///
/// let result = dispatcher.handle("Show me a map").unwrap();
/// assert_eq!(result.message(), "map");
/// ```
pub struct Dispatcher {
    classifier: Classifier,
    documents: Arc<dyn Handler>,
    air_quality: Arc<dyn Handler>,
    visualization: Arc<dyn Handler>,
}

impl Dispatcher {
    /// Starts a builder whose classifier uses `model`.
    pub fn builder(model: Arc<dyn LanguageModel>) -> DispatcherBuilder {
        DispatcherBuilder::new(model)
    }

    /// Classifies `question` and runs the selected handler.
    ///
    /// Fails only when the question is empty or classification fails. Handler-level
    /// problems come back as result text.
    pub fn route(&self, question: &str) -> Result<Routed, RouteError> {
        let request = Request::new(question)?;
        let decision = self.classifier.classify(&request)?;
        info!(%decision, "routing question");

        let result = self.handler_for(decision).run(&request);
        debug!(
            %decision,
            chars = result.message().len(),
            chart = result.chart().is_some(),
            "handler finished"
        );
        Ok(Routed { decision, result })
    }

    /// Like [`Dispatcher::route`] but returns only the handler result.
    pub fn handle(&self, question: &str) -> Result<HandlerResult, RouteError> {
        self.route(question).map(|routed| routed.result)
    }

    fn handler_for(&self, decision: RoutingDecision) -> &dyn Handler {
        match decision {
            RoutingDecision::DocumentLookup => self.documents.as_ref(),
            RoutingDecision::AirQuality => self.air_quality.as_ref(),
            RoutingDecision::Visualization => self.visualization.as_ref(),
        }
    }
}

/// Assembles a [`Dispatcher`]. All three handlers are required.
pub struct DispatcherBuilder {
    model: Arc<dyn LanguageModel>,
    documents: Option<Arc<dyn Handler>>,
    air_quality: Option<Arc<dyn Handler>>,
    visualization: Option<Arc<dyn Handler>>,
}

/// Returned by [`DispatcherBuilder::build`] when a handler was not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No handler configured for {0}")]
pub struct MissingHandler(pub RoutingDecision);

impl DispatcherBuilder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            documents: None,
            air_quality: None,
            visualization: None,
        }
    }

    pub fn document_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.documents = Some(handler);
        self
    }

    pub fn air_quality_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.air_quality = Some(handler);
        self
    }

    pub fn visualization_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.visualization = Some(handler);
        self
    }

    pub fn build(self) -> Result<Dispatcher, MissingHandler> {
        Ok(Dispatcher {
            classifier: Classifier::new(self.model),
            documents: self
                .documents
                .ok_or(MissingHandler(RoutingDecision::DocumentLookup))?,
            air_quality: self
                .air_quality
                .ok_or(MissingHandler(RoutingDecision::AirQuality))?,
            visualization: self
                .visualization
                .ok_or(MissingHandler(RoutingDecision::Visualization))?,
        })
    }
}
