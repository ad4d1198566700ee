//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. Key behavior depends on
//! which panel has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl+C`: Quit from any focus state
/// - `q`: Quit when the answer panel is focused
/// - `Tab` / `Shift+Tab`: Switch panels
/// - `Esc`: Return to the question input
/// - When `QuestionInput` focused: character input edits the question, Enter submits it
/// - When `Answer` focused: j/k scroll
///
/// # Examples
///
/// ```
/// use ecoroute::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new();
/// let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// let should_quit = handle_key_event(&mut app, key);
/// assert!(should_quit);
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
        app.next_focus();
        return false;
    }

    if key.code == KeyCode::Esc {
        app.reset_focus();
        return false;
    }

    match app.focus() {
        Focus::QuestionInput => handle_question_input(app, key),
        Focus::Answer => return handle_answer(app, key),
    }

    false
}

fn handle_question_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_input_char(c);
        }
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Enter => app.submit(),
        _ => {}
    }
}

/// Returns `true` on quit.
fn handle_answer(app: &mut App, key: KeyEvent) -> bool {
    if !key.modifiers.is_empty() {
        return false;
    }
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_answer_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_answer_up(1),
        KeyCode::PageDown => app.scroll_answer_down(10),
        KeyCode::PageUp => app.scroll_answer_up(10),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            let modifiers = if c.is_uppercase() {
                KeyModifiers::SHIFT
            } else {
                KeyModifiers::NONE
            };
            assert!(!handle_key_event(app, KeyEvent::new(KeyCode::Char(c), modifiers)));
        }
    }

    #[test]
    fn ctrl_c_quits_from_any_focus() {
        let mut app = App::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_key_event(&mut app, ctrl_c));

        app.next_focus();
        assert!(handle_key_event(&mut app, ctrl_c));
    }

    #[test]
    fn q_is_typed_in_question_input() {
        let mut app = App::new();

        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))));

        assert_eq!(app.input(), "q");
    }

    #[test]
    fn q_quits_from_answer_panel() {
        let mut app = App::new();
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Answer);

        assert!(handle_key_event(&mut app, key(KeyCode::Char('q'))));
    }

    #[test]
    fn typing_and_enter_queue_question() {
        let mut app = App::new();
        type_text(&mut app, "Air in Paris");
        handle_key_event(&mut app, key(KeyCode::Backspace));
        type_text(&mut app, "s");

        handle_key_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.take_pending().as_deref(), Some("Air in Paris"));
        assert_eq!(app.input(), "");
    }

    #[test]
    fn tab_and_back_tab_toggle_focus() {
        let mut app = App::new();
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Answer);
        handle_key_event(&mut app, KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(app.focus(), Focus::QuestionInput);
    }

    #[test]
    fn esc_returns_to_input() {
        let mut app = App::new();
        app.next_focus();

        handle_key_event(&mut app, key(KeyCode::Esc));

        assert_eq!(app.focus(), Focus::QuestionInput);
    }

    #[test]
    fn answer_panel_scrolls_with_j_and_k() {
        let mut app = App::new();
        app.next_focus();

        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Char('k')));

        assert_eq!(app.answer_scroll(), 1);
        assert_eq!(app.input(), "");
    }

    #[test]
    fn control_chords_are_not_typed() {
        let mut app = App::new();
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(app.input(), "");
    }
}
