use termreq_core::text_buffer::TextBuffer;

use crate::model::HttpMethod;

/// Identifies each text surface. Every pane exists for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneId {
    Url,
    Params,
    Headers,
    Response,
    /// The modal single-field editor, opened from `Url`.
    Overlay,
}

impl PaneId {
    /// Tab order of the primary panes.
    pub const PRIMARY_CYCLE: [PaneId; 4] =
        [PaneId::Url, PaneId::Params, PaneId::Headers, PaneId::Response];

    /// Next primary pane, wrapping. The overlay has no successor.
    pub fn next(self) -> Self {
        match self {
            PaneId::Url => PaneId::Params,
            PaneId::Params => PaneId::Headers,
            PaneId::Headers => PaneId::Response,
            PaneId::Response => PaneId::Url,
            PaneId::Overlay => PaneId::Overlay,
        }
    }

    pub fn is_primary(self) -> bool {
        self != PaneId::Overlay
    }
}

/// Title of the URL pane, which doubles as the method indicator.
pub fn url_title(method: HttpMethod) -> String {
    format!("(1) {}", method.as_str())
}

/// A titled text surface.
#[derive(Debug, Clone)]
pub struct Pane {
    pub id: PaneId,
    pub title: String,
    /// Whether keys typed while focused edit the buffer.
    pub editable: bool,
    pub buffer: TextBuffer,
    /// First visible line, for read-only panes.
    pub scroll: usize,
}

impl Pane {
    pub fn new(id: PaneId, title: impl Into<String>, editable: bool, text: &str) -> Self {
        Self {
            id,
            title: title.into(),
            editable,
            buffer: TextBuffer::from_text(text),
            scroll: 0,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Replace the whole buffer and scroll back to the top.
    pub fn replace(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self, amount: usize) {
        let max = self.buffer.line_count().saturating_sub(1);
        self.scroll = (self.scroll + amount).min(max);
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }
}
