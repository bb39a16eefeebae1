use crate::help_popup::HelpEntry;
use crate::keybinds::{Action, InputMode};
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

/// The boundary between the driver loop and a tool's state.
///
/// The hub owns the terminal and the event loop; a tool owns its panes and
/// reacts to keys. Actions a tool does not consume (quit, help) are returned
/// to the hub.
pub trait Tool {
    /// The display name of the tool (e.g., "HTTP").
    fn name(&self) -> &str;

    /// The tool's current input mode (for status bar display).
    fn mode(&self) -> InputMode;

    /// Help entries specific to this tool (shown alongside global keybinds).
    fn help_entries(&self) -> Vec<HelpEntry> {
        Vec::new()
    }

    /// Handle a key event. Returns an Action describing what happened.
    fn handle_key(&mut self, key: KeyEvent) -> Action;

    /// Handle bracketed paste.
    fn handle_paste(&mut self, text: &str) {
        let _ = text;
    }

    /// Render the tool's UI into the given area.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// One-line summary for the status bar.
    fn status_info(&self) -> String {
        String::new()
    }

    /// Called every tick for background polling and animations.
    fn tick(&mut self) {}
}
