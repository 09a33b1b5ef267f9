/// Single-line text buffer with a byte cursor kept on char boundaries.
#[derive(Clone, Debug, Default)]
pub(super) struct Input {
    pub(super) buf: String,
    pub(super) cursor: usize,
}

impl Input {
    pub(super) fn with_value(s: &str) -> Self {
        let mut input = Self::default();
        input.set(s.to_string());
        input
    }

    pub(super) fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    pub(super) fn insert_char(&mut self, c: char) {
        self.buf.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub(super) fn backspace(&mut self) {
        let Some(prev) = self.buf[..self.cursor].chars().next_back() else {
            return;
        };
        self.cursor -= prev.len_utf8();
        self.buf.remove(self.cursor);
    }

    pub(super) fn delete(&mut self) {
        if self.cursor >= self.buf.len() {
            return;
        }
        self.buf.remove(self.cursor);
    }

    pub(super) fn move_left(&mut self) {
        if let Some(prev) = self.buf[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub(super) fn move_right(&mut self) {
        if let Some(next) = self.buf[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub(super) fn set(&mut self, s: String) {
        self.buf = s;
        self.cursor = self.buf.len();
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub(super) fn cursor_col(&self) -> usize {
        self.buf[..self.cursor].chars().count()
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/input_tests.rs"]
mod tests;
