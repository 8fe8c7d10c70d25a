//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Effects
//!
//! `update()` returns an `Effect`; anything that needs the network is
//! performed on a tokio task and its resulting `Action` comes back over an
//! `mpsc` channel that the loop drains between input events. The tickets
//! inside the core controllers drop any result that arrives too late.
//!
//! ## Redraw Strategy
//!
//! Draws happen only after an input event or a completed effect. While
//! something is in flight the poll timeout is short so results show up
//! promptly; otherwise the loop sleeps up to 500ms.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::api::Backend;
use crate::core::action::{Action, Effect, update};
use crate::core::auth::AuthStatus;
use crate::core::effect::perform;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBox, InputEvent, MessageListState, SidebarEvent, SidebarState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives keys that are not global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Files,
    Chat,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    pub sidebar: SidebarState,
    pub message_list: MessageListState,
    pub chat_input: InputBox,
    pub login_input: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            focus: Focus::Files,
            sidebar: SidebarState::new(),
            message_list: MessageListState::new(),
            chat_input: InputBox::new("Ask"),
            login_input: InputBox::new("Authorization code"),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; ignored where unsupported.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Runs effects on the tokio runtime and feeds their actions back.
struct Dispatcher {
    backend: Arc<dyn Backend>,
    tx: mpsc::Sender<Action>,
}

impl Dispatcher {
    /// Applies `action` and starts whatever I/O it asks for.
    /// Returns true when the app should exit.
    fn dispatch(&self, app: &mut App, action: Action) -> bool {
        match update(app, action) {
            Effect::Quit => true,
            Effect::None => false,
            effect => {
                self.spawn_effect(effect);
                false
            }
        }
    }

    fn spawn_effect(&self, effect: Effect) {
        debug!("Spawning effect: {:?}", effect);
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(action) = perform(effect, backend.as_ref()).await
                && tx.send(action).is_err()
            {
                warn!("Dropped effect result: receiver gone");
            }
        });
    }
}

/// Must be called from within a tokio runtime.
pub fn run(app: App, backend: Arc<dyn Backend>) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let result = {
        let _terminal_mode_guard = TerminalModeGuard::new()
            .inspect_err(|e| warn!("Could not enable terminal modes: {}", e))
            .ok();
        event_loop(&mut terminal, app, backend)
    };
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    mut app: App,
    backend: Arc<dyn Backend>,
) -> std::io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher { backend, tx };
    let mut tui = TuiState::new();

    if app.gate.is_authenticated() {
        dispatcher.dispatch(&mut app, Action::OpenRoot);
    }

    let mut needs_redraw = true;
    loop {
        if app.needs_login_url() {
            dispatcher.dispatch(&mut app, Action::BeginLogin);
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if has_work_in_flight(&app) {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            needs_redraw = true;
            if handle_event(&mut app, &mut tui, &dispatcher, event) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatcher.dispatch(&mut app, action) {
                return Ok(());
            }
        }
    }

    info!("Exiting");
    Ok(())
}

fn has_work_in_flight(app: &App) -> bool {
    app.chat.is_pending()
        || app.browser.is_loading()
        || app.login_url_pending
        || app.gate.status() == AuthStatus::Authenticating
}

/// Routes one input event. Returns true when the app should exit.
fn handle_event(app: &mut App, tui: &mut TuiState, dispatcher: &Dispatcher, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Resize => return false,
        TuiEvent::ForceQuit => return dispatcher.dispatch(app, Action::Quit),
        _ => {}
    }

    if !app.gate.is_authenticated() {
        return handle_signed_out(app, tui, dispatcher, event);
    }

    match event {
        TuiEvent::Refresh => dispatcher.dispatch(app, Action::Refresh),
        TuiEvent::ClearSelection => dispatcher.dispatch(app, Action::ClearSelection),
        TuiEvent::Logout => {
            tui.chat_input.clear();
            tui.sidebar.reset();
            tui.message_list.reset();
            tui.focus = Focus::Files;
            dispatcher.dispatch(app, Action::Logout)
        }
        TuiEvent::SwitchFocus => {
            tui.focus = match tui.focus {
                Focus::Files => Focus::Chat,
                Focus::Chat => Focus::Files,
            };
            false
        }
        TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::PageUp | TuiEvent::PageDown => {
            tui.message_list.handle_event(&event);
            false
        }
        _ => match tui.focus {
            Focus::Files => handle_files(app, tui, dispatcher, event),
            Focus::Chat => handle_chat(app, tui, dispatcher, event),
        },
    }
}

fn handle_signed_out(
    app: &mut App,
    tui: &mut TuiState,
    dispatcher: &Dispatcher,
    event: TuiEvent,
) -> bool {
    if event == TuiEvent::Refresh {
        return dispatcher.dispatch(app, Action::BeginLogin);
    }
    tui.login_input.locked = app.gate.status() == AuthStatus::Authenticating;
    match tui.login_input.handle_event(&event) {
        Some(InputEvent::Submit(input)) => {
            // Fresh panes for whoever signs in next.
            tui.sidebar.reset();
            tui.message_list.reset();
            dispatcher.dispatch(app, Action::CompleteLogin(input))
        }
        _ => false,
    }
}

fn handle_files(app: &mut App, tui: &mut TuiState, dispatcher: &Dispatcher, event: TuiEvent) -> bool {
    match event {
        // Typing anywhere starts a question.
        TuiEvent::InputChar(c) if c != ' ' => {
            tui.focus = Focus::Chat;
            handle_chat(app, tui, dispatcher, event)
        }
        TuiEvent::Paste(_) => {
            tui.focus = Focus::Chat;
            handle_chat(app, tui, dispatcher, event)
        }
        _ => match tui.sidebar.handle_event(&event) {
            Some(SidebarEvent::Activate(index)) => {
                let Some(entry) = app.browser.listing().get(index).cloned() else {
                    return false;
                };
                if entry.is_folder() {
                    // A refused descent keeps the highlight where it was.
                    if !app.browser.is_loading() {
                        tui.sidebar.reset();
                    }
                    dispatcher.dispatch(app, Action::Descend(entry))
                } else {
                    dispatcher.dispatch(app, Action::ToggleSelection(entry))
                }
            }
            Some(SidebarEvent::Toggle(index)) => match app.browser.listing().get(index).cloned() {
                Some(entry) => dispatcher.dispatch(app, Action::ToggleSelection(entry)),
                None => false,
            },
            Some(SidebarEvent::Back) => {
                if app.browser.depth() == 0 {
                    return false;
                }
                if !app.browser.is_loading() {
                    tui.sidebar.reset();
                }
                dispatcher.dispatch(app, Action::Back)
            }
            None => false,
        },
    }
}

fn handle_chat(app: &mut App, tui: &mut TuiState, dispatcher: &Dispatcher, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Escape => {
            tui.focus = Focus::Files;
            false
        }
        TuiEvent::CursorUp | TuiEvent::CursorDown => {
            tui.message_list.handle_event(&event);
            false
        }
        _ => {
            tui.chat_input.locked = app.chat.is_pending();
            match tui.chat_input.handle_event(&event) {
                Some(InputEvent::Submit(text)) => {
                    tui.message_list.stick_to_bottom = true;
                    dispatcher.dispatch(app, Action::Submit(text))
                }
                _ => false,
            }
        }
    }
}
