use crate::keybinds::InputMode;
use crate::text_buffer::TextBuffer;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Render the bottom status bar showing the current mode and optional info.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    mode: InputMode,
    tool_name: &str,
    info: &str,
) {
    let mode_style = match mode {
        InputMode::Normal => Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
        InputMode::Insert => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        InputMode::Overlay => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", mode.label()), mode_style),
        Span::raw(" "),
        Span::styled(tool_name, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(info, Style::default().add_modifier(Modifier::DIM)),
    ]);

    let bar = Paragraph::new(line).style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(bar, area);
}

/// Screen layout: main content + status bar (1 line).
/// Returns (content_area, status_area).
pub fn screen_layout(area: Rect) -> (Rect, Rect) {
    let [content_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    (content_area, status_area)
}

/// Bordered block for a pane. Focused panes get a highlighted border.
pub fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border_color = if focused {
        Color::Blue
    } else {
        Color::DarkGray
    };
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

/// Vertical scroll offset that keeps the buffer cursor inside `height` rows.
pub fn follow_cursor_offset(buffer: &TextBuffer, height: u16) -> usize {
    let visible = height as usize;
    if visible == 0 {
        return 0;
    }
    buffer.cursor_row.saturating_sub(visible - 1)
}

/// Render an editable buffer inside `area`, placing the terminal cursor when focused.
pub fn render_buffer(frame: &mut Frame, area: Rect, buffer: &TextBuffer, focused: bool) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let offset = follow_cursor_offset(buffer, area.height);
    let paragraph =
        Paragraph::new(buffer.text()).scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);

    if focused {
        let row = u16::try_from(buffer.cursor_row - offset).unwrap_or(u16::MAX);
        let cursor_x = area.x.saturating_add(cursor_column(buffer));
        let cursor_y = area.y.saturating_add(row);
        if cursor_x < area.right() && cursor_y < area.bottom() {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

/// Cursor display column, clamped to terminal coordinates.
pub fn cursor_column(buffer: &TextBuffer) -> u16 {
    u16::try_from(buffer.cursor_display_col()).unwrap_or(u16::MAX)
}

/// Helper to create a centered rect within a given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
