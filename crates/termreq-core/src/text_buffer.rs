use unicode_width::UnicodeWidthStr;

/// A single editing operation applied to a [`TextBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Bracketed paste; `\r` is dropped and `\n` splits lines.
    Paste(String),
}

/// A multi-line text buffer with a 2D cursor, backing every pane.
///
/// Lines are stored without trailing newlines. `cursor_col` is a byte offset
/// into the current line and always sits on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    /// Sticky column for vertical movement.
    desired_col: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            desired_col: 0,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer
    }

    /// Read the whole buffer back as one string.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the content wholesale, cursor back to the origin.
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.goto_top();
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Append text after the last line. The cursor does not move.
    pub fn append(&mut self, text: &str) {
        let mut incoming = split_lines(text).into_iter();
        if let (Some(first), Some(last)) = (incoming.next(), self.lines.last_mut()) {
            last.push_str(&first);
        }
        self.lines.extend(incoming);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.cursor_row]
    }

    /// Display width of the text left of the cursor on the current line.
    pub fn cursor_display_col(&self) -> usize {
        self.current_line()[..self.cursor_col].width()
    }

    pub fn apply(&mut self, op: EditOp) {
        match op {
            EditOp::Insert(c) => self.insert_char(c),
            EditOp::Newline => self.insert_newline(),
            EditOp::Backspace => self.backspace(),
            EditOp::Delete => self.delete_char(),
            EditOp::Left => self.cursor_left(),
            EditOp::Right => self.cursor_right(),
            EditOp::Up => self.cursor_up(),
            EditOp::Down => self.cursor_down(),
            EditOp::Home => self.cursor_home(),
            EditOp::End => self.cursor_end(),
            EditOp::Paste(text) => self.insert_text(&text),
        }
    }

    // ── Cursor movement ──────────────────────────────────────────────

    pub fn cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col = self.current_line()[..self.cursor_col]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.desired_col = self.cursor_col;
        }
    }

    pub fn cursor_right(&mut self) {
        let line = self.current_line();
        if let Some(c) = line[self.cursor_col..].chars().next() {
            self.cursor_col += c.len_utf8();
            self.desired_col = self.cursor_col;
        }
    }

    pub fn cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = snap_to_char_boundary(&self.lines[self.cursor_row], self.desired_col);
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = snap_to_char_boundary(&self.lines[self.cursor_row], self.desired_col);
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_col = 0;
        self.desired_col = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_col = self.current_line().len();
        self.desired_col = self.cursor_col;
    }

    pub fn goto_top(&mut self) {
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.desired_col = 0;
    }

    /// Cursor after the last character of the last line.
    pub fn goto_end(&mut self) {
        self.cursor_row = self.lines.len() - 1;
        self.cursor_end();
    }

    // ── Editing ──────────────────────────────────────────────────────

    pub fn insert_char(&mut self, c: char) {
        self.lines[self.cursor_row].insert(self.cursor_col, c);
        self.cursor_col += c.len_utf8();
        self.desired_col = self.cursor_col;
    }

    /// Split the current line at the cursor.
    pub fn insert_newline(&mut self) {
        let after = self.lines[self.cursor_row].split_off(self.cursor_col);
        self.lines.insert(self.cursor_row + 1, after);
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.desired_col = 0;
    }

    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.insert_newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    /// Delete the character before the cursor, merging with the previous
    /// line at column 0.
    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_left();
            self.lines[self.cursor_row].remove(self.cursor_col);
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
            self.desired_col = self.cursor_col;
            self.lines[self.cursor_row].push_str(&current);
        }
    }

    /// Delete the character under the cursor, pulling the next line up at
    /// end of line.
    pub fn delete_char(&mut self) {
        if self.cursor_col < self.current_line().len() {
            self.lines[self.cursor_row].remove(self.cursor_col);
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
        }
    }
}

/// `split` always yields at least one piece, so a buffer never has zero lines.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(String::from).collect()
}

/// Largest char boundary of `s` that is `<= target`.
fn snap_to_char_boundary(s: &str, target: usize) -> usize {
    if target >= s.len() {
        return s.len();
    }
    (0..=target)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0)
}
