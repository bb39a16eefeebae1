use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use tracing::info;

use termreq_core::{
    help_popup::{self, HelpPopup},
    keybinds::Action,
    tool::Tool,
    ui,
};

/// The main application state.
pub struct App {
    /// The request composer.
    tool: Box<dyn Tool>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Help popup state.
    help_popup: HelpPopup,
}

impl App {
    pub fn new(tool: Box<dyn Tool>) -> Self {
        Self {
            tool,
            should_quit: false,
            help_popup: HelpPopup::new(),
        }
    }

    /// Called every ~50ms for async polling and animations.
    pub fn tick(&mut self) {
        self.tool.tick();
    }

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Paste(text) if !self.help_popup.visible => self.tool.handle_paste(&text),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl-c always quits
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        if self.help_popup.visible {
            self.handle_help_key(key);
            return;
        }

        let action = self.tool.handle_key(key);
        self.process_action(action);
    }

    /// Process an action the tool did not consume.
    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
            Action::Help => self.show_help(),
            _ => {}
        }
    }

    /// Show the help popup with tool-specific + global keybinds.
    fn show_help(&mut self) {
        let mut entries = self.tool.help_entries();
        entries.extend(help_popup::global_help_entries());
        self.help_popup
            .show(format!("{} Help", self.tool.name()), entries);
    }

    /// Handle key events while the help popup is visible.
    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => self.help_popup.hide(),
            KeyCode::Char('j') | KeyCode::Down => self.help_popup.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.help_popup.scroll_up(),
            _ => {}
        }
    }

    pub fn is_help_visible(&self) -> bool {
        self.help_popup.visible
    }

    /// Render the entire application.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let (content_area, status_area) = ui::screen_layout(area);

        self.tool.render(frame, content_area);

        let info = self.tool.status_info();
        ui::render_status_bar(
            frame,
            status_area,
            self.tool.mode(),
            self.tool.name(),
            &info,
        );

        // Rendered last, on top
        self.help_popup.render(frame, area);
    }
}
