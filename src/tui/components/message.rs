use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::{Role, Turn};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Borders (1 left + 1 right) plus padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

/// One conversation turn in a rounded box.
///
/// User turns are plain green text; assistant turns are rendered from
/// markdown in blue. Transient: built each frame by `MessageList`.
#[derive(Clone, Copy)]
pub struct TurnView<'a> {
    pub turn: &'a Turn,
}

impl<'a> TurnView<'a> {
    pub fn new(turn: &'a Turn) -> Self {
        Self { turn }
    }

    /// Rendered height at `width`, borders included.
    ///
    /// Measured with `Paragraph::line_count` so the prediction matches the
    /// wrapping actually used in `render`.
    pub fn calculate_height(turn: &Turn, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = Self::paragraph(turn).line_count(content_width).max(1);
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    fn color(role: Role) -> Color {
        match role {
            Role::User => Color::Green,
            Role::Assistant => Color::Blue,
        }
    }

    fn paragraph(turn: &Turn) -> Paragraph<'static> {
        let color = Self::color(turn.role);
        let text = match turn.role {
            Role::User => Text::styled(turn.content.trim().to_string(), Style::default().fg(color)),
            Role::Assistant => markdown::render(turn.content.trim(), color),
        };
        Paragraph::new(text).wrap(Wrap { trim: false })
    }
}

impl<'a> Widget for TurnView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, color) = match self.turn.role {
            Role::User => ("you", Self::color(Role::User)),
            Role::Assistant => ("docent", Self::color(Role::Assistant)),
        };
        let border_style = Style::default().fg(color);

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        Self::paragraph(self.turn).render(inner, buf);
    }
}

impl<'a> Component for TurnView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
