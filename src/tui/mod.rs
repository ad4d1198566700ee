//! Terminal User Interface for asking questions interactively.
//!
//! Provides a question input, a markdown answer panel and an emissions map panel
//! using ratatui for rendering and crossterm for terminal management.

use std::io;
use std::panic;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

mod app;
pub mod event;
mod ui;

pub use app::{Answer, App, Focus};

use crate::dispatcher::Dispatcher;

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
/// Returns a configured Terminal instance.
///
/// # Errors
///
/// Returns an error if terminal initialization fails.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Disables raw mode and leaves the alternate screen.
/// This should always be called before exiting the TUI,
/// even in error cases, to prevent terminal corruption.
///
/// # Errors
///
/// Returns an error if terminal restoration fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for panic handler.
///
/// Does not require a Terminal reference, making it safe to call
/// from a panic hook where we may not have access to the Terminal.
/// Ignores errors since we're likely already in a bad state.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Initializes a panic hook that restores the terminal before panicking.
///
/// This ensures the terminal is restored even if a panic occurs anywhere
/// in the application, not just in the event loop. The original panic
/// hook is preserved and called after terminal restoration.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the main event loop for the TUI.
///
/// Polls for keyboard events, routes submitted questions through `dispatcher`, and
/// re-renders. Exits on Ctrl+C, or `q` from the answer panel.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App, dispatcher: &Dispatcher) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, dispatcher, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(
    app: &mut App,
    dispatcher: &Dispatcher,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        // The pending state was drawn above; routing blocks until the handler returns.
        if process_pending(app, dispatcher) {
            continue;
        }

        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && event::handle_key_event(app, key)
        {
            break;
        }
    }

    Ok(())
}

/// Routes the queued question, if any. Returns `true` when one was processed.
fn process_pending(app: &mut App, dispatcher: &Dispatcher) -> bool {
    let Some(question) = app.take_pending() else {
        return false;
    };

    let outcome = dispatcher.route(&question);
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "question could not be routed");
    }
    app.record_outcome(question, outcome);
    true
}

/// Entry point for the TUI application.
///
/// # Errors
///
/// Returns an error if terminal initialization or the event loop fails.
pub fn run(dispatcher: &Dispatcher) -> Result<()> {
    init_panic_hook();

    let mut app = App::new();
    run_event_loop(&mut app, dispatcher).context("TUI event loop failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Handler;
    use crate::llm::{LanguageModel, LlmError, ModelResponse};
    use crate::models::{HandlerResult, Request, RoutingDecision};
    use std::sync::Arc;

    struct Label(&'static str);

    impl LanguageModel for Label {
        fn invoke(&self, _prompt: &str) -> Result<ModelResponse, LlmError> {
            Ok(self.0.into())
        }
    }

    struct Echo;

    impl Handler for Echo {
        fn run(&self, request: &Request) -> HandlerResult {
            HandlerResult::text(format!("echo: {}", request.question()))
        }
    }

    fn dispatcher(label: &'static str) -> Dispatcher {
        Dispatcher::builder(Arc::new(Label(label)))
            .document_handler(Arc::new(Echo))
            .air_quality_handler(Arc::new(Echo))
            .visualization_handler(Arc::new(Echo))
            .build()
            .unwrap()
    }

    #[test]
    fn nothing_pending_does_not_route() {
        let mut app = App::new();
        assert!(!process_pending(&mut app, &dispatcher("retrieve_internal")));
        assert!(app.answer().is_none());
    }

    #[test]
    fn pending_question_is_routed_and_recorded() {
        let mut app = App::new();
        for c in "Air in Lille?".chars() {
            app.push_input_char(c);
        }
        app.submit();

        assert!(process_pending(&mut app, &dispatcher("fetch_air_quality")));

        let answer = app.answer().unwrap();
        assert_eq!(answer.heading, RoutingDecision::AirQuality.heading());
        assert_eq!(answer.body, "echo: Air in Lille?");
        assert!(!app.is_pending());
    }

    #[test]
    fn routing_failure_is_recorded_as_error() {
        let mut app = App::new();
        app.push_input_char('x');
        app.submit();

        assert!(process_pending(&mut app, &dispatcher("unknown_agent")));

        let answer = app.answer().unwrap();
        assert!(answer.is_error);
        assert!(answer.body.contains("unknown_agent"));
    }
}
