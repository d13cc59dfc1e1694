/// Smallest input box, borders included.
pub const MIN_INPUT_HEIGHT: u16 = 5;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Multi-line requirement buffer. The cursor is a character index into `text`.
#[derive(Debug, Clone, Default)]
pub struct RequirementInput {
    text: String,
    cursor: usize,
}

impl RequirementInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    /// Insert pasted text at the cursor, normalising CRLF line endings.
    pub fn insert_str(&mut self, s: &str) {
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        let idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(idx, &normalized);
        self.cursor += normalized.chars().count();
    }

    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(idx);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let idx = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    /// Move to the same column on the previous line, or to the start of the text.
    pub fn move_up(&mut self) {
        let (row, col) = self.cursor_position();
        if row == 0 {
            self.cursor = 0;
        } else {
            self.move_to(row - 1, col);
        }
    }

    /// Move to the same column on the next line, or to the end of the text.
    pub fn move_down(&mut self) {
        let (row, col) = self.cursor_position();
        if row + 1 >= self.line_spans().len() {
            self.cursor = self.text.chars().count();
        } else {
            self.move_to(row + 1, col);
        }
    }

    /// (start, length) of every logical line, in characters.
    fn line_spans(&self) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        for line in self.text.split('\n') {
            let len = line.chars().count();
            spans.push((start, len));
            start += len + 1;
        }
        spans
    }

    fn move_to(&mut self, row: usize, col: usize) {
        if let Some(&(start, len)) = self.line_spans().get(row) {
            self.cursor = start + col.min(len);
        }
    }

    /// Move to the start of the current line.
    pub fn move_home(&mut self) {
        let (_, col) = self.cursor_position();
        self.cursor -= col;
    }

    /// Move to the end of the current line.
    pub fn move_end(&mut self) {
        let rest = self.text.chars().skip(self.cursor);
        let to_eol = rest.take_while(|&c| c != '\n').count();
        self.cursor += to_eol;
    }

    /// Logical (row, column) of the cursor, counted in characters.
    pub fn cursor_position(&self) -> (usize, usize) {
        let mut row = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }

    /// Number of screen rows the text occupies when wrapped at `width` columns.
    pub fn visual_rows(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        let mut rows: u16 = 0;
        for line in self.text.split('\n') {
            let char_count = line.chars().count();
            rows = rows.saturating_add((char_count / width + 1) as u16);
        }
        rows
    }

    /// The text broken into screen rows of at most `width` characters.
    /// A line that exactly fills its last row is followed by an empty row,
    /// which is where the cursor sits after typing the row's final character.
    pub fn wrapped_lines(&self, width: u16) -> Vec<String> {
        let width = width.max(1) as usize;
        let mut rows = Vec::new();
        for line in self.text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(width) {
                rows.push(chunk.iter().collect());
            }
            if chars.len() % width == 0 {
                rows.push(String::new());
            }
        }
        rows
    }

    /// Cursor as (row, column) within `wrapped_lines(width)`.
    pub fn visual_cursor(&self, width: u16) -> (usize, usize) {
        let width = width.max(1) as usize;
        let (row, col) = self.cursor_position();
        let rows_above: usize = self
            .text
            .split('\n')
            .take(row)
            .map(|line| line.chars().count() / width + 1)
            .sum();
        (rows_above + col / width, col % width)
    }

    /// First visible row for a box `height` rows tall, moved only as far as
    /// needed to keep the cursor row on screen.
    pub fn scroll_for_cursor(&self, width: u16, height: u16, scroll: u16) -> u16 {
        let height = height.max(1);
        let (row, _) = self.visual_cursor(width);
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        let max_scroll = self.visual_rows(width).saturating_sub(height);

        let scroll = if row < scroll {
            row
        } else if row >= scroll.saturating_add(height) {
            row + 1 - height
        } else {
            scroll
        };
        scroll.min(max_scroll)
    }

    /// Auto-resized box height: wrapped text plus borders, clamped to `max_height`.
    pub fn desired_height(&self, inner_width: u16, max_height: u16) -> u16 {
        let max_height = max_height.max(MIN_INPUT_HEIGHT);
        self.visual_rows(inner_width)
            .saturating_add(2)
            .clamp(MIN_INPUT_HEIGHT, max_height)
    }
}
