use crate::chart::EmissionsMap;
use crate::models::{RouteError, Routed};

/// Application state for the TUI.
///
/// Holds the question being typed, the last routed answer and its chart, and panel focus.
#[derive(Debug, Clone)]
pub struct App {
    /// Question input buffer
    input: String,
    /// Currently focused panel
    focus: Focus,
    /// Question submitted with Enter and not yet routed
    pending: Option<String>,
    /// Result of the last routed question
    answer: Option<Answer>,
    /// Chart produced by the last routed question
    chart: Option<EmissionsMap>,
    /// One-line status shown in the shortcut bar
    status: Option<String>,
    /// Scroll offset for the answer panel
    answer_scroll: u16,
}

/// Panel focus state for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Question input is focused (typing edits the question, Enter submits it)
    QuestionInput,
    /// Answer panel is focused (j/k scroll)
    Answer,
}

/// What the answer panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub question: String,
    pub heading: String,
    /// Markdown body
    pub body: String,
    pub is_error: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates a new App with an empty question and no answer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecoroute::tui::{App, Focus};
    ///
    /// let app = App::new();
    /// assert_eq!(app.focus(), Focus::QuestionInput);
    /// assert!(app.answer().is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            input: String::new(),
            focus: Focus::QuestionInput,
            pending: None,
            answer: None,
            chart: None,
            status: None,
            answer_scroll: 0,
        }
    }

    /// Returns the question input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the current focus state.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    pub fn chart(&self) -> Option<&EmissionsMap> {
        self.chart.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// True while a submitted question waits for routing.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    /// Queues the current input for routing.
    ///
    /// A blank input only sets a status message. The input is cleared on submit.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecoroute::tui::App;
    ///
    /// let mut app = App::new();
    /// app.push_input_char('?');
    /// app.submit();
    /// assert!(app.is_pending());
    /// assert_eq!(app.input(), "");
    /// ```
    pub fn submit(&mut self) {
        if self.pending.is_some() {
            return;
        }

        let question = self.input.trim();
        if question.is_empty() {
            self.status = Some(RouteError::EmptyQuestion.to_string());
            return;
        }

        self.pending = Some(question.to_string());
        self.status = Some("Routing question...".to_string());
        self.input.clear();
    }

    /// Takes the queued question, if any.
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Records the outcome of routing `question`.
    ///
    /// The chart is replaced on every outcome, so it always belongs to the shown answer.
    pub fn record_outcome(&mut self, question: String, outcome: Result<Routed, RouteError>) {
        self.answer_scroll = 0;

        match outcome {
            Ok(routed) => {
                let (body, chart) = routed.result.into_parts();
                self.status = Some(format!("Routed to {}", routed.decision));
                self.answer = Some(Answer {
                    question,
                    heading: routed.decision.heading().to_string(),
                    body,
                    is_error: false,
                });
                self.chart = chart;
            }
            Err(e) => {
                self.status = Some("Request failed".to_string());
                self.answer = Some(Answer {
                    question,
                    heading: "Error".to_string(),
                    body: e.to_string(),
                    is_error: true,
                });
                self.chart = None;
            }
        }
    }

    /// Cycles focus between the input and the answer panel.
    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::QuestionInput => Focus::Answer,
            Focus::Answer => Focus::QuestionInput,
        };
    }

    /// Returns focus to the question input.
    pub fn reset_focus(&mut self) {
        self.focus = Focus::QuestionInput;
    }

    /// Returns the scroll offset for the answer panel.
    pub fn answer_scroll(&self) -> u16 {
        self.answer_scroll
    }

    pub fn scroll_answer_down(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(amount);
    }

    pub fn scroll_answer_up(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(amount);
    }
}
