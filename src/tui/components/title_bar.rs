//! # TitleBar Component
//!
//! One line at the top: who is signed in, how many documents are attached
//! to the next question, and the latest status message.
//!
//! ```text
//! Docent | ada@contoso.com | 2 attached | Thinking...
//! ```
//!
//! Stateless: everything arrives as props, so it can be rebuilt every frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    /// `None` when signed out.
    pub username: Option<String>,
    pub attached: usize,
    pub status_message: String,
    /// Status is rendered red when it describes a failure.
    pub is_error: bool,
}

impl TitleBar {
    pub fn new(
        username: Option<String>,
        attached: usize,
        status_message: String,
        is_error: bool,
    ) -> Self {
        Self {
            username,
            attached,
            status_message,
            is_error,
        }
    }

    fn line(&self) -> Line<'static> {
        let separator = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![Span::styled(
            "Docent",
            Style::default().add_modifier(Modifier::BOLD),
        )];

        spans.push(separator());
        spans.push(match &self.username {
            Some(name) => Span::styled(name.clone(), Style::default().fg(Color::Cyan)),
            None => Span::styled("signed out", Style::default().fg(Color::DarkGray)),
        });

        if self.attached > 0 {
            spans.push(separator());
            spans.push(Span::styled(
                format!("{} attached", self.attached),
                Style::default().fg(Color::Yellow),
            ));
        }

        if !self.status_message.is_empty() {
            spans.push(separator());
            let style = if self.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            spans.push(Span::styled(self.status_message.clone(), style));
        }

        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
