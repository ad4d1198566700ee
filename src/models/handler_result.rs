use crate::chart::EmissionsMap;

use super::routing::RoutingDecision;

/// Output of the one handler that processed a request.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult {
    text: String,
    chart: Option<EmissionsMap>,
}

impl HandlerResult {
    /// Creates a text-only result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chart: None,
        }
    }

    /// Creates a result carrying a chart artifact.
    pub fn with_chart(text: impl Into<String>, chart: EmissionsMap) -> Self {
        Self {
            text: text.into(),
            chart: Some(chart),
        }
    }

    /// Returns the result text (markdown).
    pub fn message(&self) -> &str {
        &self.text
    }

    /// Returns the chart, if the handler produced one.
    pub fn chart(&self) -> Option<&EmissionsMap> {
        self.chart.as_ref()
    }

    /// Consumes the result, returning the text and chart.
    pub fn into_parts(self) -> (String, Option<EmissionsMap>) {
        (self.text, self.chart)
    }
}

/// A handler result paired with the decision that selected the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub decision: RoutingDecision,
    pub result: HandlerResult,
}
