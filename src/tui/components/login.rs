//! # Login View
//!
//! Shown instead of the browser and chat while signed out.
//!
//! ```text
//!   Sign in to Docent
//!
//!   1. Open this address in a browser:
//!      https://login.example/authorize?...
//!   2. Paste the address you were sent back to, or just the code:
//!   ╭ Authorization code ───────────────────╮
//!   │ https://localhost:3000/auth/callback?… │
//!   ╰───────────────────────────────────────╯
//!   Authentication failed.
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::components::input_box::InputBox;

pub struct LoginView<'a> {
    pub login_url: Option<&'a str>,
    pub url_pending: bool,
    /// An exchange is in flight.
    pub exchanging: bool,
    pub error: Option<&'a str>,
    pub input: &'a mut InputBox,
}

impl<'a> LoginView<'a> {
    fn instructions(&self) -> Vec<Line<'static>> {
        let muted = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::from(Span::styled(
                "Sign in to Docent",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from("1. Open this address in a browser:"),
        ];
        lines.push(match (self.login_url, self.url_pending) {
            (Some(url), _) => Line::from(Span::styled(
                format!("   {url}"),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            )),
            (None, true) => Line::from(Span::styled("   Fetching sign-in address...", muted)),
            (None, false) => Line::from(Span::styled(
                "   Sign-in address unavailable. Ctrl+R to retry.",
                muted,
            )),
        });
        lines.push(Line::from(
            "2. Paste the address you were sent back to, or just the code:",
        ));
        lines
    }

    fn footer(&self) -> Option<Line<'static>> {
        if self.exchanging {
            return Some(Line::from(Span::styled(
                "Signing in...",
                Style::default().fg(Color::Yellow),
            )));
        }
        self.error.map(|message| {
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            ))
        })
    }
}

impl<'a> Component for LoginView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = Rect {
            x: area.x + 2,
            width: area.width.saturating_sub(4),
            y: area.y + 1,
            height: area.height.saturating_sub(1),
        };
        let instructions = Paragraph::new(self.instructions()).wrap(Wrap { trim: false });
        let instructions_height = u16::try_from(instructions.line_count(inner.width))
            .unwrap_or(u16::MAX);
        let input_height = self.input.calculate_height(inner.width);

        let [top, input_area, footer_area] = Layout::vertical([
            Constraint::Length(instructions_height),
            Constraint::Length(input_height),
            Constraint::Min(0),
        ])
        .areas(inner);

        frame.render_widget(instructions, top);
        self.input.locked = self.exchanging;
        self.input.render(frame, input_area);
        if let Some(footer) = self.footer() {
            frame.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), footer_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(login_url: Option<&str>, url_pending: bool, exchanging: bool, error: Option<&str>) -> String {
        let backend = TestBackend::new(70, 14);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = InputBox::new("Authorization code");
        terminal
            .draw(|f| {
                LoginView {
                    login_url,
                    url_pending,
                    exchanging,
                    error,
                    input: &mut input,
                }
                .render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_shows_url_and_error() {
        let text = draw(
            Some("https://login.example/authorize"),
            false,
            false,
            Some("Authentication failed."),
        );
        assert!(text.contains("https://login.example/authorize"));
        assert!(text.contains("Authentication failed."));
        assert!(text.contains("Authorization code"));
    }

    #[test]
    fn test_pending_states() {
        let text = draw(None, true, true, None);
        assert!(text.contains("Fetching sign-in address"));
        assert!(text.contains("Signing in..."));
    }
}
