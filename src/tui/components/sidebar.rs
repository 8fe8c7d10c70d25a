//! # Sidebar Component
//!
//! The folder browser. Shows the breadcrumb as the block title and the
//! current listing below it, folders first as the backend sends them.
//!
//! ```text
//! ┌ / Docs / Q3 ───────────┐
//! │ ▸ Drafts/              │
//! │ > [x] report.docx      │
//! │   [ ] notes.txt        │
//! └────────────────────────┘
//! ```
//!
//! `SidebarState` keeps the highlighted row between frames. The listing
//! itself is a prop, so the state only learns its length at render time.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph, Wrap};

use crate::core::browser::FolderBrowser;
use crate::core::selection::SelectionTracker;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Shown for a successful but empty listing.
pub const EMPTY_FOLDER_HINT: &str = "No files found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarEvent {
    /// Enter on the highlighted row: open a folder, attach a file.
    Activate(usize),
    /// Space on the highlighted row.
    Toggle(usize),
    Back,
}

#[derive(Debug, Default)]
pub struct SidebarState {
    list: ListState,
    len: usize,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.list.selected().filter(|i| *i < self.len)
    }

    /// Called after the listing changes so the highlight starts at the top.
    pub fn reset(&mut self) {
        self.list.select(None);
        *self.list.offset_mut() = 0;
    }

    fn sync_len(&mut self, len: usize) {
        self.len = len;
        match self.list.selected() {
            _ if len == 0 => self.list.select(None),
            None => self.list.select(Some(0)),
            Some(i) if i >= len => self.list.select(Some(len - 1)),
            Some(_) => {}
        }
    }
}

impl EventHandler for SidebarState {
    type Event = SidebarEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::CursorUp => {
                if let Some(i) = self.highlighted() {
                    self.list.select(Some(i.saturating_sub(1)));
                }
                None
            }
            TuiEvent::CursorDown => {
                if let Some(i) = self.highlighted()
                    && i + 1 < self.len
                {
                    self.list.select(Some(i + 1));
                }
                None
            }
            TuiEvent::Submit | TuiEvent::CursorRight => {
                self.highlighted().map(SidebarEvent::Activate)
            }
            TuiEvent::InputChar(' ') => self.highlighted().map(SidebarEvent::Toggle),
            TuiEvent::Backspace | TuiEvent::CursorLeft => Some(SidebarEvent::Back),
            _ => None,
        }
    }
}

/// Created fresh each frame.
pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub browser: &'a FolderBrowser,
    pub selection: &'a SelectionTracker,
    pub focused: bool,
}

impl<'a> Sidebar<'a> {
    fn title(&self) -> String {
        let crumbs = self.browser.breadcrumb();
        if crumbs.is_empty() {
            " / ".to_string()
        } else {
            format!(" / {} ", crumbs.join(" / "))
        }
    }

    /// Message shown instead of the list, if any.
    fn placeholder(&self) -> Option<(String, Style)> {
        if let Some(err) = self.browser.last_error() {
            return Some((
                format!("Failed to load: {err}\nCtrl+R to retry"),
                Style::default().fg(Color::Red),
            ));
        }
        if !self.browser.listing().is_empty() {
            return None;
        }
        if self.browser.is_loading() || !self.browser.has_loaded() {
            return Some(("Loading...".to_string(), Style::default().fg(Color::DarkGray)));
        }
        Some((
            EMPTY_FOLDER_HINT.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    }
}

impl<'a> Component for Sidebar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title());

        let entries = self.browser.listing();
        self.state.sync_len(entries.len());

        // A failed refresh keeps the old listing; show the error above it.
        let mut list_area = block.inner(area);
        frame.render_widget(block, area);
        if let Some((message, style)) = self.placeholder() {
            let height = if entries.is_empty() {
                list_area.height
            } else {
                2.min(list_area.height)
            };
            let message_area = Rect { height, ..list_area };
            frame.render_widget(
                Paragraph::new(message).style(style).wrap(Wrap { trim: true }),
                message_area,
            );
            list_area.y += height;
            list_area.height = list_area.height.saturating_sub(height);
        }
        if entries.is_empty() || list_area.height == 0 {
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                let line = if entry.is_folder() {
                    Line::from(vec![
                        Span::styled("▸ ", Style::default().fg(Color::Blue)),
                        Span::styled(
                            format!("{}/", entry.name),
                            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                        ),
                    ])
                } else if self.selection.contains(&entry.id) {
                    Line::from(vec![
                        Span::styled("[x] ", Style::default().fg(Color::Yellow)),
                        Span::raw(entry.name.clone()),
                    ])
                } else {
                    Line::from(vec![
                        Span::styled("[ ] ", Style::default().fg(Color::DarkGray)),
                        Span::raw(entry.name.clone()),
                    ])
                };
                ListItem::new(line)
            })
            .collect();

        let highlight = if self.focused {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .highlight_style(highlight)
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.state.list);
    }
}
