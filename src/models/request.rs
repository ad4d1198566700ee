use std::fmt;

use super::routing::RouteError;

/// A single question submitted for routing.
///
/// The question is trimmed on construction and never empty afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    question: String,
}

impl Request {
    /// Creates a request, rejecting blank questions.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecoroute::Request;
    ///
    /// let request = Request::new("  What is the air quality in Lyon?  ").unwrap();
    /// assert_eq!(request.question(), "What is the air quality in Lyon?");
    ///
    /// assert!(Request::new("   ").is_err());
    /// ```
    pub fn new(question: impl Into<String>) -> Result<Self, RouteError> {
        let question = question.into();
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(RouteError::EmptyQuestion);
        }

        Ok(Self {
            question: trimmed.to_string(),
        })
    }

    /// Returns the question text.
    pub fn question(&self) -> &str {
        &self.question
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_question() {
        let request = Request::new("\n Show me the emissions map \t").unwrap();
        assert_eq!(request.question(), "Show me the emissions map");
    }

    #[test]
    fn new_rejects_empty_and_whitespace() {
        assert!(matches!(Request::new(""), Err(RouteError::EmptyQuestion)));
        assert!(matches!(
            Request::new(" \n\t "),
            Err(RouteError::EmptyQuestion)
        ));
    }
}
