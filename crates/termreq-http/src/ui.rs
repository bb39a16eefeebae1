use crate::model::HttpMethod;
use crate::pane::{Pane, PaneId};
use crate::state::Composer;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Clear, Paragraph, Wrap},
};
use termreq_core::ui::{centered_rect, cursor_column, pane_block, render_buffer};

/// Widest the URL overlay grows on large terminals.
const OVERLAY_MAX_WIDTH: u16 = 80;

// ── Colors ───────────────────────────────────────────────────────────

fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::Get => Color::Green,
        HttpMethod::Post => Color::Yellow,
        HttpMethod::Put => Color::Blue,
        HttpMethod::Patch => Color::Rgb(255, 165, 0), // orange
        HttpMethod::Delete => Color::Red,
    }
}

fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Yellow,
        500..=599 => Color::Red,
        _ => Color::White,
    }
}

// ── Main entry point ─────────────────────────────────────────────────

/// Render all panes, and the overlay on top when it is open.
///
/// ```text
/// ┌ (1) GET ─────────────────────────────────┐
/// └──────────────────────────────────────────┘
/// ┌ (2) Params ─┐┌ (4) Response ─────────────┐
/// └─────────────┘│                           │
/// ┌ (3) Headers ┐│                           │
/// └─────────────┘└───────────────────────────┘
/// ```
pub fn render_composer(frame: &mut Frame, area: Rect, composer: &Composer) {
    let [url_area, lower_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).areas(area);
    let [left_area, response_area] =
        Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)]).areas(lower_area);
    let [params_area, headers_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(left_area);

    let focused = composer.focused();

    render_url_pane(frame, url_area, composer, focused == PaneId::Url);
    render_editable_pane(frame, params_area, &composer.params, focused == PaneId::Params);
    render_editable_pane(frame, headers_area, &composer.headers, focused == PaneId::Headers);
    render_response_pane(frame, response_area, &composer.response, focused == PaneId::Response);

    if focused == PaneId::Overlay {
        render_overlay(frame, area, &composer.overlay);
    }
}

// ── URL ──────────────────────────────────────────────────────────────

fn render_url_pane(frame: &mut Frame, area: Rect, composer: &Composer, focused: bool) {
    let block = pane_block(&composer.url.title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let method = composer.method();
    let method_style = Style::default()
        .fg(Color::Black)
        .bg(method_color(method))
        .add_modifier(Modifier::BOLD);
    let url_style = if focused {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };

    let url = composer.url.text();
    let mut spans = vec![
        Span::styled(format!(" {} ", method.as_str()), method_style),
        Span::raw(" "),
    ];
    if url.trim().is_empty() {
        spans.push(Span::styled(
            "press : to enter a URL",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(url, url_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ── Params / Headers ─────────────────────────────────────────────────

fn render_editable_pane(frame: &mut Frame, area: Rect, pane: &Pane, focused: bool) {
    let block = pane_block(&pane.title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if pane.buffer.is_empty() && !focused {
        let hint = Paragraph::new("key=value, one per line").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    render_buffer(frame, inner, &pane.buffer, focused);
}

// ── Response ─────────────────────────────────────────────────────────

fn render_response_pane(frame: &mut Frame, area: Rect, pane: &Pane, focused: bool) {
    let block = pane_block(&pane.title, focused);

    let lines: Vec<Line> = pane
        .buffer
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| style_response_line(i, line))
        .collect();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(pane.scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

fn style_response_line(index: usize, line: &str) -> Line<'_> {
    if index == 0 {
        if let Some(status) = line.strip_prefix("Status: ") {
            let code = status
                .split_whitespace()
                .next()
                .and_then(|c| c.parse::<u16>().ok())
                .unwrap_or(0);
            return Line::from(vec![
                Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    status,
                    Style::default()
                        .fg(status_color(code))
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
        }
        if line.starts_with("Error") {
            return Line::styled(line, Style::default().fg(Color::Red));
        }
    }
    match line {
        "Headers:" | "Body:" => Line::styled(line, Style::default().add_modifier(Modifier::BOLD)),
        _ => Line::raw(line),
    }
}

// ── Overlay ──────────────────────────────────────────────────────────

fn render_overlay(frame: &mut Frame, area: Rect, pane: &Pane) {
    let width = area.width.saturating_sub(4).min(OVERLAY_MAX_WIDTH);
    let popup_area = centered_rect(width, 3, area);
    frame.render_widget(Clear, popup_area);

    let block = pane_block(&pane.title, true).border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Single line: scroll horizontally so the cursor stays visible
    let cursor_col = cursor_column(&pane.buffer);
    let offset = cursor_col.saturating_sub(inner.width.saturating_sub(1));
    let paragraph = Paragraph::new(pane.buffer.current_line()).scroll((0, offset));
    frame.render_widget(paragraph, inner);

    frame.set_cursor_position((inner.x.saturating_add(cursor_col - offset), inner.y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::state::PaneEvent;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_status_line_is_colored_by_code() {
        let line = style_response_line(0, "Status: 404 Not Found");
        assert_eq!(line.spans[1].content, "404 Not Found");
        assert_eq!(line.spans[1].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_error_line_is_red() {
        let line = style_response_line(0, "Error sending request: refused");
        assert_eq!(line.style.fg, Some(Color::Red));
    }

    #[test]
    fn test_overlay_renders_very_long_url() {
        let mut composer = Composer::new(&Settings::default());
        composer
            .url
            .replace(&format!("http://x/{}", "a".repeat(70_000)));
        composer.handle(PaneEvent::OpenOverlay);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| render_composer(frame, frame.area(), &composer))
            .unwrap();
        assert_eq!(composer.focused(), PaneId::Overlay);
    }

    #[test]
    fn test_body_lines_are_plain() {
        let line = style_response_line(7, "Status: not a header here");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.style, Style::default());
    }
}
