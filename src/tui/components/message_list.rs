//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! `MessageList` is transient (built each frame) and borrows
//! `&'a mut MessageListState`, which keeps the scroll position and the
//! measured turn heights between frames. Turns never change once appended,
//! so heights are only measured for new turns or after a width change.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::Turn;
use crate::core::state::WELCOME_MESSAGE;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::TurnView;
use crate::tui::event::TuiEvent;

pub const THINKING_INDICATOR: &str = "Thinking...";

/// Rows reserved under the last turn while a reply is pending.
const INDICATOR_HEIGHT: u16 = 1;

/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, new turns scroll into view.
    pub stick_to_bottom: bool,
    /// Last known viewport height, for clamping between frames.
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    /// Forget everything; used when the conversation is reset.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn max_offset(&self) -> u16 {
        self.layout.total().saturating_sub(self.viewport_height)
    }

    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scrolling down past the end re-engages auto-scroll.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::PageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::PageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Measured turn heights.
#[derive(Debug, Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    content_width: u16,
}

impl LayoutCache {
    /// Measures any turns not yet cached. A width change or a shorter
    /// conversation (after a reset) invalidates everything.
    pub fn update(&mut self, turns: &[Turn], content_width: u16) {
        if self.content_width != content_width || self.heights.len() > turns.len() {
            self.heights.clear();
            self.content_width = content_width;
        }
        for turn in &turns[self.heights.len()..] {
            self.heights
                .push(TurnView::calculate_height(turn, content_width));
        }
    }

    pub fn total(&self) -> u16 {
        self.heights.iter().fold(0u16, |acc, h| acc.saturating_add(*h))
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub turns: &'a [Turn],
    /// A reply is outstanding.
    pub is_pending: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, turns: &'a [Turn], is_pending: bool) -> Self {
        Self {
            state,
            turns,
            is_pending,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.turns.is_empty() {
            self.state.reset();
            let welcome = Paragraph::new(format!(
                "{WELCOME_MESSAGE}\n\nSelect documents on the left, then ask a question below."
            ))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
            let top = area.height / 3;
            let welcome_area = Rect {
                y: area.y + top,
                height: area.height.saturating_sub(top),
                ..area
            };
            frame.render_widget(welcome, welcome_area);
            return;
        }

        // -1 for the scrollbar
        let content_width = area.width.saturating_sub(1);
        self.state.layout.update(self.turns, content_width);

        let indicator = if self.is_pending { INDICATOR_HEIGHT } else { 0 };
        let canvas_height = self.state.layout.total().saturating_add(indicator);

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (turn, height) in self.turns.iter().zip(&self.state.layout.heights) {
            scroll_view.render_widget(TurnView::new(turn), Rect::new(0, y, content_width, *height));
            y = y.saturating_add(*height);
        }
        if self.is_pending {
            let thinking = Paragraph::new(format!(" {THINKING_INDICATOR}")).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            scroll_view.render_widget(thinking, Rect::new(0, y, content_width, INDICATOR_HEIGHT));
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut MessageListState, turns: &[Turn], pending: bool, height: u16) -> String {
        let backend = TestBackend::new(40, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(&mut *state, turns, pending).render(f, f.area());
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
    fn test_empty_conversation_shows_welcome() {
        let text = draw(&mut MessageListState::new(), &[], false, 12);
        assert!(text.contains(WELCOME_MESSAGE));
    }

    #[test]
    fn test_pending_reply_shows_indicator() {
        let turns = vec![Turn::user("what changed?")];
        let text = draw(&mut MessageListState::new(), &turns, true, 12);
        assert!(text.contains("what changed?"));
        assert!(text.contains(THINKING_INDICATOR));

        let text = draw(&mut MessageListState::new(), &turns, false, 12);
        assert!(!text.contains(THINKING_INDICATOR));
    }

    #[test]
    fn test_layout_cache_extends_and_invalidates() {
        let mut cache = LayoutCache::default();
        let mut turns = vec![Turn::user("a")];
        cache.update(&turns, 40);
        assert_eq!(cache.heights, vec![3]);

        turns.push(Turn::assistant("b"));
        cache.update(&turns, 40);
        assert_eq!(cache.heights.len(), 2);
        assert_eq!(cache.total(), 6);

        cache.update(&turns[..0], 40);
        assert!(cache.heights.is_empty());
    }

    #[test]
    fn test_scroll_up_unpins_and_scroll_down_repins() {
        let turns: Vec<Turn> = (0..10).map(|i| Turn::user(format!("turn {i}"))).collect();
        let mut state = MessageListState::new();
        draw(&mut state, &turns, false, 8);

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        for _ in 0..40 {
            state.handle_event(&TuiEvent::ScrollDown);
        }
        assert!(state.stick_to_bottom);
    }
}
