//! # InputBox Component
//!
//! A wrapping multi-line text field. Used for chat questions and for the
//! authorization code on the login screen.
//!
//! The buffer and cursor are internal state. `locked` is a prop: while the
//! parent has a request in flight, Enter keeps the text instead of emitting
//! `Submit`, so nothing typed is lost.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders (2) plus one column of padding per side.
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top and bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;
/// Content lines shown before the box scrolls internally.
const MAX_VISIBLE_LINES: u16 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Title on the top border.
    pub title: String,
    /// Prop: Enter is ignored while set.
    pub locked: bool,
    /// Prop: draw the terminal cursor.
    pub focused: bool,
    /// Byte offset into `buffer`.
    cursor: usize,
    scroll_offset: u16,
}

impl InputBox {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            title: title.into(),
            locked: false,
            focused: true,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// Height needed for the current buffer, between 3 and
    /// `MAX_VISIBLE_LINES + VERTICAL_OVERHEAD`.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let rows = wrap_rows(&self.buffer, inner_width(width)).len();
        let rows = u16::try_from(rows).unwrap_or(u16::MAX);
        rows.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Row and column of the cursor within the wrapped buffer.
    fn cursor_row_col(&self, rows: &[Range<usize>]) -> (usize, usize) {
        let row = rows
            .iter()
            .rposition(|r| r.start <= self.cursor)
            .unwrap_or(0);
        let col = rows
            .get(row)
            .map(|r| self.buffer[r.start..self.cursor].width())
            .unwrap_or(0);
        (row, col)
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }
}

/// Wrapped rows of `text` as byte ranges.
///
/// Hard newlines always start a new row; each logical line is wrapped with
/// textwrap, breaking words longer than `width`. A trailing newline yields
/// a final empty row so the cursor has somewhere to sit.
fn wrap_rows(text: &str, width: u16) -> Vec<Range<usize>> {
    let options = textwrap::Options::new(usize::from(width.max(1)))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);

    let mut rows = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        let mut search_from = 0;
        for piece in textwrap::wrap(line, &options) {
            // Pieces are in-order substrings with trailing spaces trimmed.
            let start = line[search_from..]
                .find(piece.as_ref())
                .map(|i| search_from + i)
                .unwrap_or(search_from);
            let end = start + piece.len();
            rows.push(line_start + start..line_start + end);
            search_from = end;
        }
        line_start += line.len() + 1;
    }
    if rows.is_empty() {
        rows.push(0..0);
    }
    rows
}

fn inner_width(width: u16) -> u16 {
    width.saturating_sub(HORIZONTAL_OVERHEAD)
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = wrap_rows(&self.buffer, inner_width(area.width));
        let (row, col) = self.cursor_row_col(&rows);
        let visible = usize::from(area.height.saturating_sub(VERTICAL_OVERHEAD).max(1));

        // Keep the cursor row in view.
        let mut offset = usize::from(self.scroll_offset);
        if row < offset {
            offset = row;
        } else if row >= offset + visible {
            offset = row + 1 - visible;
        }
        self.scroll_offset = u16::try_from(offset).unwrap_or(0);

        let text = rows
            .iter()
            .skip(offset)
            .take(visible)
            .map(|r| &self.buffer[r.clone()])
            .collect::<Vec<_>>()
            .join("\n");

        let border_style = if self.locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str());
        let inner = block.inner(area);
        let padded = Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            ..inner
        };

        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Green)),
            padded,
        );

        if self.focused {
            let col = u16::try_from(col)
                .unwrap_or(u16::MAX)
                .min(padded.width.saturating_sub(1));
            let row = u16::try_from(row - offset).unwrap_or(0);
            frame.set_cursor_position((padded.x + col, padded.y + row));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut encoded = [0u8; 4];
                self.insert(c.encode_utf8(&mut encoded));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert(&text.replace("\r\n", "\n"));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if self.locked || self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.clear();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new("Ask");
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("ab");
        assert_eq!(input.buffer, "ab");
        assert_eq!(
            input.handle_event(&TuiEvent::Backspace),
            Some(InputEvent::ContentChanged)
        );
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("café");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(input.buffer, "caf!é");
        input.handle_event(&TuiEvent::CursorRight);
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "caf!");
    }

    #[test]
    fn test_submit_takes_buffer() {
        let mut input = typed("hello");
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("hello".to_string()))
        );
        assert!(input.buffer.is_empty());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut input = typed("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   ");
    }

    #[test]
    fn test_locked_submit_keeps_text() {
        let mut input = typed("next question");
        input.locked = true;
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "next question");
    }

    #[test]
    fn test_wrap_rows_tracks_offsets() {
        let rows = wrap_rows("hello world\nab", 6);
        assert_eq!(rows, vec![0..5, 6..11, 12..14]);
        assert_eq!(wrap_rows("", 10), vec![0..0]);
        assert_eq!(wrap_rows("a\n", 10), vec![0..1, 2..2]);
    }

    #[test]
    fn test_height_grows_then_caps() {
        let input = typed("");
        assert_eq!(input.calculate_height(40), 3);
        let input = typed("a\nb\nc");
        assert_eq!(input.calculate_height(40), 5);
        let input = typed(&"x\n".repeat(20));
        assert_eq!(input.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_render_shows_title_and_text() {
        let backend = TestBackend::new(30, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = typed("draft");
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Ask"));
        assert!(text.contains("draft"));
    }
}
