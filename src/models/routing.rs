use std::fmt;

use thiserror::Error;

use crate::llm::LlmError;

/// Which handler processes a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingDecision {
    /// Answer from the ingested sustainability documents
    DocumentLookup,
    /// Look up live air-quality data for a city
    AirQuality,
    /// Draw the CO₂ emissions map
    Visualization,
}

impl RoutingDecision {
    /// Every decision, in the order the classifier prompt lists them.
    pub const ALL: [RoutingDecision; 3] = [
        RoutingDecision::DocumentLookup,
        RoutingDecision::AirQuality,
        RoutingDecision::Visualization,
    ];

    /// Returns the label the classifier model is asked to answer with.
    pub fn label(self) -> &'static str {
        match self {
            Self::DocumentLookup => "retrieve_internal",
            Self::AirQuality => "fetch_air_quality",
            Self::Visualization => "visualize_data",
        }
    }

    /// Parses an exact classifier label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|decision| decision.label() == label)
    }

    /// Section heading shown above a handler's output.
    pub fn heading(self) -> &'static str {
        match self {
            Self::DocumentLookup => "Information from Internal Documents",
            Self::AirQuality => "Air Quality Information",
            Self::Visualization => "CO₂ Emissions in France",
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Failures that abort a request before or during classification.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The question was empty or whitespace only
    #[error("Question cannot be empty")]
    EmptyQuestion,

    /// The classifier answered with something other than a known label
    #[error("Invalid agent selected by LLM: {0}")]
    InvalidRouting(String),

    /// The classifier's model call failed
    #[error("Classification failed: {0}")]
    Model(#[from] LlmError),
}

impl RouteError {
    /// Returns true for failures caused by the caller's input or the model's answer
    /// rather than by infrastructure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::EmptyQuestion | Self::InvalidRouting(_))
    }
}
