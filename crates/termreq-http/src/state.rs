//! Focus and editing state machine.
//!
//! [`Composer::handle`] applies one event and returns the side effect for
//! the driver to run. Network I/O never happens in here.

use termreq_core::keybinds::InputMode;
use termreq_core::text_buffer::EditOp;
use tracing::{debug, info, warn};

use crate::builder::build;
use crate::error::RequestError;
use crate::formatter::format_response;
use crate::model::{HttpMethod, RequestDescriptor, ResponseRecord};
use crate::pane::{Pane, PaneId, url_title};
use crate::parser::parse_kv_buffer;
use crate::settings::{RESPONSE_PLACEHOLDER, SENDING_PLACEHOLDER, Settings};

/// Which pane is active and which method is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusState {
    pub active: PaneId,
    /// Index into [`HttpMethod::ALL`].
    pub method_index: usize,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            active: PaneId::Url,
            method_index: 0,
        }
    }
}

impl FocusState {
    pub fn method(&self) -> HttpMethod {
        HttpMethod::from_index(self.method_index)
    }

    pub fn cycle_method(&mut self) {
        self.method_index = (self.method_index + 1) % HttpMethod::ALL.len();
    }

    /// Advance through the primary cycle. No-op while the overlay is open.
    pub fn next_pane(&mut self) {
        self.active = self.active.next();
    }
}

/// Discrete user events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneEvent {
    NextPane,
    CycleMethod,
    OpenOverlay,
    CommitOverlay,
    CancelOverlay,
    Dispatch,
    Quit,
    ScrollDown(usize),
    ScrollUp(usize),
    Edit(EditOp),
}

/// Work the driver must do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Send this request and feed the outcome to [`Composer::complete_dispatch`].
    Send(RequestDescriptor),
    Quit,
}

/// The whole request-composition state: panes plus focus.
#[derive(Debug, Clone)]
pub struct Composer {
    pub focus: FocusState,
    pub url: Pane,
    pub params: Pane,
    pub headers: Pane,
    pub response: Pane,
    pub overlay: Pane,
    in_flight: bool,
}

impl Composer {
    pub fn new(settings: &Settings) -> Self {
        let focus = FocusState::default();
        Self {
            url: Pane::new(PaneId::Url, url_title(focus.method()), false, &settings.seed_url),
            params: Pane::new(PaneId::Params, "(2) Params", true, &settings.seed_params),
            headers: Pane::new(PaneId::Headers, "(3) Headers", true, &settings.seed_headers),
            response: Pane::new(PaneId::Response, "(4) Response", false, RESPONSE_PLACEHOLDER),
            overlay: Pane::new(PaneId::Overlay, "Edit Value", true, ""),
            focus,
            in_flight: false,
        }
    }

    pub fn pane(&self, id: PaneId) -> &Pane {
        match id {
            PaneId::Url => &self.url,
            PaneId::Params => &self.params,
            PaneId::Headers => &self.headers,
            PaneId::Response => &self.response,
            PaneId::Overlay => &self.overlay,
        }
    }

    fn pane_mut(&mut self, id: PaneId) -> &mut Pane {
        match id {
            PaneId::Url => &mut self.url,
            PaneId::Params => &mut self.params,
            PaneId::Headers => &mut self.headers,
            PaneId::Response => &mut self.response,
            PaneId::Overlay => &mut self.overlay,
        }
    }

    pub fn focused(&self) -> PaneId {
        self.focus.active
    }

    pub fn method(&self) -> HttpMethod {
        self.focus.method()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn mode(&self) -> InputMode {
        match self.focus.active {
            PaneId::Overlay => InputMode::Overlay,
            id if self.pane(id).editable => InputMode::Insert,
            _ => InputMode::Normal,
        }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: PaneEvent) -> Effect {
        match event {
            PaneEvent::Quit => return Effect::Quit,
            PaneEvent::NextPane => self.focus.next_pane(),
            PaneEvent::CycleMethod => {
                self.focus.cycle_method();
                self.url.title = url_title(self.focus.method());
            }
            PaneEvent::OpenOverlay => self.open_overlay(),
            PaneEvent::CommitOverlay => self.commit_overlay(),
            PaneEvent::CancelOverlay => self.close_overlay(),
            PaneEvent::Dispatch => return self.begin_dispatch(),
            PaneEvent::ScrollDown(n) if self.focus.active == PaneId::Response => {
                self.response.scroll_down(n)
            }
            PaneEvent::ScrollUp(n) if self.focus.active == PaneId::Response => {
                self.response.scroll_up(n)
            }
            PaneEvent::ScrollDown(_) | PaneEvent::ScrollUp(_) => {}
            PaneEvent::Edit(EditOp::Paste(text)) if self.focus.active == PaneId::Overlay => {
                // The overlay holds a single line
                let line: String = text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
                self.overlay.buffer.apply(EditOp::Paste(line));
            }
            PaneEvent::Edit(op) => {
                let pane = self.pane_mut(self.focus.active);
                if pane.editable {
                    pane.buffer.apply(op);
                }
            }
        }
        Effect::None
    }

    fn open_overlay(&mut self) {
        if self.focus.active != PaneId::Url {
            return;
        }
        let current = self.url.text();
        self.overlay.replace(current.trim());
        self.overlay.buffer.goto_end();
        self.focus.active = PaneId::Overlay;
    }

    fn commit_overlay(&mut self) {
        if self.focus.active != PaneId::Overlay {
            return;
        }
        let value = self.overlay.text();
        let value = value.trim();
        info!(url = value, "url updated");
        self.url.replace(value);
        self.close_overlay();
    }

    fn close_overlay(&mut self) {
        if self.focus.active == PaneId::Overlay {
            self.overlay.replace("");
            self.focus.active = PaneId::Url;
        }
    }

    /// Parse the panes and build the request for the selected method.
    pub fn compose(&self) -> Result<RequestDescriptor, RequestError> {
        let params = parse_kv_buffer(&self.params.text());
        let headers = parse_kv_buffer(&self.headers.text());
        build(self.method(), &self.url.text(), &params, &headers)
    }

    fn begin_dispatch(&mut self) -> Effect {
        if !self.focus.active.is_primary() {
            return Effect::None;
        }
        if self.in_flight {
            debug!("dispatch ignored: a request is already in flight");
            return Effect::None;
        }

        match self.compose() {
            Ok(descriptor) => {
                self.in_flight = true;
                self.response.replace(SENDING_PLACEHOLDER);
                Effect::Send(descriptor)
            }
            Err(e) => {
                warn!("request not sent: {e}");
                self.response.replace(&e.to_string());
                Effect::None
            }
        }
    }

    /// Write the final outcome of the in-flight request into the Response pane.
    pub fn complete_dispatch(&mut self, outcome: Result<ResponseRecord, RequestError>) {
        self.in_flight = false;
        let text = match outcome {
            Ok(record) => format_response(&record),
            Err(e) => e.to_string(),
        };
        self.response.replace(&text);
    }
}
