//! Leaf handlers selected by the dispatcher.
//!
//! Each handler turns a request into a `HandlerResult`. Collaborator failures are
//! reported as result text rather than propagated, so a handler always returns.

mod air_quality;
mod document;
mod visualization;

pub use air_quality::{AirQualityHandler, DEFAULT_CITY};
pub use document::{DocumentHandler, MAX_CONTEXT_DOCUMENTS};
pub use visualization::{DEFAULT_DATASET_PATH, VisualizationHandler};

use crate::models::{HandlerResult, Request};

/// A unit that answers one category of request.
pub trait Handler: Send + Sync {
    /// Produces the result for `request`.
    fn run(&self, request: &Request) -> HandlerResult;
}
