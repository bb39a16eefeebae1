use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::text_buffer::EditOp;

/// Input modes. Derived from which pane holds focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// A read-only pane is focused. Keys are commands.
    #[default]
    Normal,
    /// An editable pane is focused. Printable keys edit the buffer.
    Insert,
    /// The modal single-field editor is open.
    Overlay,
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Overlay => "OVERLAY",
        }
    }
}

/// Actions that can result from processing a key event.
/// Tools and the hub return these to signal what should happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The key was consumed but nothing happens.
    None,
    /// Quit the program.
    Quit,
    /// Show help.
    Help,
    /// Move focus to the next pane in tab order.
    NextPane,
    /// Advance the HTTP method selector.
    CycleMethod,
    /// Open the modal editor for the focused field.
    OpenOverlay,
    /// Confirm the modal editor.
    Submit,
    /// Dismiss the modal editor.
    Cancel,
    /// Send the composed request.
    Dispatch,
    /// Scroll a read-only pane down by N lines.
    ScrollDown(usize),
    /// Scroll a read-only pane up by N lines.
    ScrollUp(usize),
    /// Edit the focused buffer.
    Edit(EditOp),
}

/// Map a key event to an action for the given input mode.
pub fn process_key(key: KeyEvent, mode: InputMode) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Bindings shared by every mode
    match key.code {
        KeyCode::Char('c') if ctrl => return Action::Quit,
        KeyCode::Char('s') if ctrl => return Action::Dispatch,
        KeyCode::Char('n') if ctrl => return Action::CycleMethod,
        KeyCode::Tab => return Action::NextPane,
        _ => {}
    }

    match mode {
        InputMode::Normal => process_normal_key(key),
        InputMode::Insert => edit_key(key).map_or(Action::None, Action::Edit),
        InputMode::Overlay => match key.code {
            KeyCode::Enter => Action::Submit,
            KeyCode::Esc => Action::Cancel,
            _ => edit_key(key).map_or(Action::None, Action::Edit),
        },
    }
}

fn process_normal_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char(':') | KeyCode::Char('e') | KeyCode::Enter => Action::OpenOverlay,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown(1),
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp(1),
        KeyCode::PageDown => Action::ScrollDown(10),
        KeyCode::PageUp => Action::ScrollUp(10),
        _ => Action::None,
    }
}

/// Keys that edit a buffer in Insert and Overlay modes.
fn edit_key(key: KeyEvent) -> Option<EditOp> {
    let op = match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            EditOp::Insert(c)
        }
        KeyCode::Enter => EditOp::Newline,
        KeyCode::Backspace => EditOp::Backspace,
        KeyCode::Delete => EditOp::Delete,
        KeyCode::Left => EditOp::Left,
        KeyCode::Right => EditOp::Right,
        KeyCode::Up => EditOp::Up,
        KeyCode::Down => EditOp::Down,
        KeyCode::Home => EditOp::Home,
        KeyCode::End => EditOp::End,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_global_bindings_in_every_mode() {
        for mode in [InputMode::Normal, InputMode::Insert, InputMode::Overlay] {
            assert_eq!(process_key(ctrl('c'), mode), Action::Quit);
            assert_eq!(process_key(ctrl('s'), mode), Action::Dispatch);
            assert_eq!(process_key(ctrl('n'), mode), Action::CycleMethod);
            assert_eq!(process_key(key(KeyCode::Tab), mode), Action::NextPane);
        }
    }

    #[test]
    fn test_q_only_quits_in_normal_mode() {
        assert_eq!(process_key(key(KeyCode::Char('q')), InputMode::Normal), Action::Quit);
        assert_eq!(
            process_key(key(KeyCode::Char('q')), InputMode::Insert),
            Action::Edit(EditOp::Insert('q'))
        );
    }

    #[test]
    fn test_colon_opens_overlay_but_types_inside_it() {
        assert_eq!(
            process_key(key(KeyCode::Char(':')), InputMode::Normal),
            Action::OpenOverlay
        );
        assert_eq!(
            process_key(key(KeyCode::Char(':')), InputMode::Overlay),
            Action::Edit(EditOp::Insert(':'))
        );
    }

    #[test]
    fn test_enter_and_esc_in_overlay() {
        assert_eq!(process_key(key(KeyCode::Enter), InputMode::Overlay), Action::Submit);
        assert_eq!(process_key(key(KeyCode::Esc), InputMode::Overlay), Action::Cancel);
        assert_eq!(
            process_key(key(KeyCode::Enter), InputMode::Insert),
            Action::Edit(EditOp::Newline)
        );
    }

    #[test]
    fn test_scroll_keys_in_normal_mode() {
        assert_eq!(process_key(key(KeyCode::Char('j')), InputMode::Normal), Action::ScrollDown(1));
        assert_eq!(process_key(key(KeyCode::PageUp), InputMode::Normal), Action::ScrollUp(10));
    }

    #[test]
    fn test_unbound_ctrl_chars_do_not_insert() {
        assert_eq!(process_key(ctrl('x'), InputMode::Insert), Action::None);
    }

    #[test]
    fn test_shifted_chars_insert() {
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(
            process_key(shifted, InputMode::Insert),
            Action::Edit(EditOp::Insert('A'))
        );
    }
}
