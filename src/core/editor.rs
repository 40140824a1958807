//! Minimal multi-line text buffer with a cursor.

/// Text buffer edited by the message and response views.
///
/// There is always at least one line, and the cursor column counts
/// characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    col: usize,
    single_line: bool,
}

impl Default for TextArea {
    fn default() -> Self {
        Self { lines: vec![String::new()], row: 0, col: 0, single_line: false }
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that ignores line breaks (used for the API key input).
    pub fn single_line() -> Self {
        Self { single_line: true, ..Self::default() }
    }

    /// Replace the content and put the cursor at the end.
    pub fn set_value(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.row = self.lines.len() - 1;
        self.col = self.current_len();
    }

    pub fn value(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    pub fn clear(&mut self) {
        *self = Self { single_line: self.single_line, ..Self::default() };
    }

    fn current_len(&self) -> usize {
        self.lines[self.row].chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_newline();
            return;
        }
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    pub fn insert_newline(&mut self) {
        if self.single_line {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        let rest = line.split_off(at);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.col = 0;
    }

    /// Delete the character before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.current_len();
            self.lines[self.row].push_str(&line);
        }
    }

    /// Delete the character under the cursor, joining with the next line at
    /// the end of a line.
    pub fn delete(&mut self) {
        if self.col < self.current_len() {
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    /// Remove the cursor's line. The cursor stays on the same row index
    /// when possible and is clamped to the new line's length.
    pub fn delete_line(&mut self) {
        self.lines.remove(self.row);
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.row = self.row.min(self.lines.len() - 1);
        self.col = self.col.min(self.current_len());
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.current_len();
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.current_len() {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.current_len());
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.current_len());
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.current_len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_newlines() {
        let mut area = TextArea::new();
        for c in "ab".chars() {
            area.insert_char(c);
        }
        area.insert_newline();
        area.insert_char('c');

        assert_eq!(area.value(), "ab\nc");
        assert_eq!(area.cursor(), (1, 1));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut area = TextArea::new();
        area.set_value("ab\ncd");
        area.move_home();
        area.backspace();

        assert_eq!(area.value(), "abcd");
        assert_eq!(area.cursor(), (0, 2));
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut area = TextArea::new();
        area.set_value("añb");
        area.move_left();
        area.backspace();
        assert_eq!(area.value(), "ab");
    }

    #[test]
    fn test_delete_line_rehomes_cursor() {
        let mut area = TextArea::new();
        area.set_value("first line\nsecond\nx");
        area.move_up();
        area.move_end();
        area.move_down();
        assert_eq!(area.cursor(), (2, 1));

        area.delete_line();
        assert_eq!(area.value(), "first line\nsecond");
        assert_eq!(area.cursor(), (1, 1));

        area.delete_line();
        area.delete_line();
        assert_eq!(area.value(), "");
        assert_eq!(area.cursor(), (0, 0));
    }

    #[test]
    fn test_single_line_ignores_newlines() {
        let mut area = TextArea::single_line();
        area.insert_char('k');
        area.insert_newline();
        area.insert_char('\n');
        assert_eq!(area.value(), "k");

        area.clear();
        area.insert_newline();
        assert_eq!(area.lines().len(), 1);
    }
}
