//! Typed shapes of a language-model response.

use std::fmt;

/// The payload returned by a [`LanguageModel`](super::LanguageModel) call.
///
/// Backends differ in how they hand back generated text: chat-style APIs wrap it in a
/// structured body, simpler ones return a bare string. Callers read both through
/// [`ModelResponse::text`] and treat `None` as an unexpected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// A structured body exposing a text field
    Structured { text: String },
    /// The body itself was a string
    PlainText(String),
    /// Neither shape; the raw body is kept for diagnostics
    Unrecognized(serde_json::Value),
}

impl ModelResponse {
    /// Classifies a decoded JSON body.
    ///
    /// An object with a string `response` field is structured, a JSON string is plain
    /// text, everything else is unrecognized.
    pub fn from_json(value: serde_json::Value) -> Self {
        if let Some(text) = value.get("response").and_then(|v| v.as_str()) {
            return Self::Structured {
                text: text.to_string(),
            };
        }

        match value {
            serde_json::Value::String(text) => Self::PlainText(text),
            other => Self::Unrecognized(other),
        }
    }

    /// Returns the generated text, if this response carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Structured { text } | Self::PlainText(text) => Some(text),
            Self::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for ModelResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured { text } | Self::PlainText(text) => write!(f, "{text}"),
            Self::Unrecognized(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for ModelResponse {
    fn from(text: String) -> Self {
        Self::PlainText(text)
    }
}

impl From<&str> for ModelResponse {
    fn from(text: &str) -> Self {
        Self::PlainText(text.to_string())
    }
}
