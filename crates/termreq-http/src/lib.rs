pub mod builder;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod model;
pub mod pane;
pub mod parser;
pub mod settings;
pub mod state;
pub mod ui;

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use termreq_core::help_popup::HelpEntry;
use termreq_core::keybinds::{Action, InputMode, process_key};
use termreq_core::text_buffer::EditOp;
use termreq_core::tool::Tool;
use tracing::error;

use crate::error::RequestError;
use crate::executor::{DispatchReport, HttpExecutor};
use crate::settings::Settings;
use crate::state::{Composer, Effect, PaneEvent};

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// The request composer wired to a background executor.
pub struct HttpTool {
    composer: Composer,
    executor: HttpExecutor,
    spinner_frame: u8,
    last_outcome: Option<String>,
}

impl HttpTool {
    pub fn new(settings: Settings) -> Result<Self> {
        let executor = HttpExecutor::spawn(settings.timeout)?;
        Ok(Self {
            composer: Composer::new(&settings),
            executor,
            spinner_frame: 0,
            last_outcome: None,
        })
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    fn apply(&mut self, event: PaneEvent) -> Action {
        match self.composer.handle(event) {
            Effect::None => Action::None,
            Effect::Quit => Action::Quit,
            Effect::Send(descriptor) => {
                if let Err(e) = self.executor.send(descriptor) {
                    error!("executor unavailable: {e}");
                    self.composer
                        .complete_dispatch(Err(RequestError::Transport(format!(
                            "executor stopped: {e}"
                        ))));
                }
                Action::None
            }
        }
    }

    fn finish(&mut self, report: DispatchReport) {
        let millis = report.elapsed.as_millis();
        let at = chrono::Local::now().format("%H:%M:%S");
        self.last_outcome = Some(match &report.outcome {
            Ok(record) => format!("{} in {millis} ms at {at}", record.status_line),
            Err(_) => format!("failed after {millis} ms at {at}"),
        });
        self.composer.complete_dispatch(report.outcome);
    }

    fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame as usize % SPINNER_FRAMES.len()]
    }
}

/// Translate a key action into a composer event. Actions the hub handles
/// itself have no event.
fn to_event(action: Action) -> Option<PaneEvent> {
    let event = match action {
        Action::Quit => PaneEvent::Quit,
        Action::NextPane => PaneEvent::NextPane,
        Action::CycleMethod => PaneEvent::CycleMethod,
        Action::OpenOverlay => PaneEvent::OpenOverlay,
        Action::Submit => PaneEvent::CommitOverlay,
        Action::Cancel => PaneEvent::CancelOverlay,
        Action::Dispatch => PaneEvent::Dispatch,
        Action::ScrollDown(n) => PaneEvent::ScrollDown(n),
        Action::ScrollUp(n) => PaneEvent::ScrollUp(n),
        Action::Edit(op) => PaneEvent::Edit(op),
        Action::None | Action::Help => return None,
    };
    Some(event)
}

impl Tool for HttpTool {
    fn name(&self) -> &str {
        "HTTP"
    }

    fn mode(&self) -> InputMode {
        self.composer.mode()
    }

    fn help_entries(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::with_section("URL pane", ": / e / Enter", "Edit URL"),
            HelpEntry::with_section("URL editor", "Enter", "Apply"),
            HelpEntry::with_section("URL editor", "Esc", "Discard"),
            HelpEntry::with_section("Params / Headers", "key=value", "One entry per line"),
            HelpEntry::with_section("Params / Headers", "Arrows", "Move cursor"),
            HelpEntry::with_section("Response", "PgDn / PgUp", "Scroll by page"),
        ]
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        let action = process_key(key, self.composer.mode());
        if action == Action::Help {
            return Action::Help;
        }
        match to_event(action) {
            Some(event) => self.apply(event),
            None => Action::None,
        }
    }

    fn handle_paste(&mut self, text: &str) {
        self.apply(PaneEvent::Edit(EditOp::Paste(text.to_string())));
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        ui::render_composer(frame, area, &self.composer);
    }

    fn status_info(&self) -> String {
        let method = self.composer.method();
        if self.composer.is_in_flight() {
            return format!("{method}  {} sending", self.spinner_char());
        }
        match &self.last_outcome {
            Some(outcome) => format!("{method}  last: {outcome}"),
            None => format!("{method}  Ctrl-s to send, ? for help"),
        }
    }

    fn tick(&mut self) {
        while let Some(report) = self.executor.try_recv() {
            self.finish(report);
        }
        if self.composer.is_in_flight() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len() as u8;
        }
    }
}
