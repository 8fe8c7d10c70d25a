use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::core::auth::AuthStatus;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{LoginView, MessageList, Sidebar, TitleBar};
use crate::tui::{Focus, TuiState};

const SIGNED_IN_HINTS: &str =
    "Tab focus · Enter open/attach · Space attach · Ctrl+R refresh · Ctrl+X clear · Ctrl+L sign out · Ctrl+C quit";
const SIGNED_OUT_HINTS: &str = "Enter sign in · Ctrl+R new sign-in address · Ctrl+C quit";

/// Width of the file browser column.
const SIDEBAR_PERCENT: u16 = 32;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area, hint_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());

    TitleBar::new(
        app.gate.username().map(str::to_string),
        app.selection.len(),
        app.status_message.clone(),
        app.last_error.is_some(),
    )
    .render(frame, title_area);

    let hints = if app.gate.is_authenticated() {
        draw_workspace(frame, main_area, app, tui);
        SIGNED_IN_HINTS
    } else {
        draw_login(frame, main_area, app, tui);
        SIGNED_OUT_HINTS
    };
    frame.render_widget(
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
        hint_area,
    );
}

fn draw_workspace(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let [files_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(SIDEBAR_PERCENT),
        Constraint::Min(0),
    ])
    .areas(area);

    Sidebar {
        state: &mut tui.sidebar,
        browser: &app.browser,
        selection: &app.selection,
        focused: tui.focus == Focus::Files,
    }
    .render(frame, files_area);

    tui.chat_input.locked = app.chat.is_pending();
    tui.chat_input.focused = tui.focus == Focus::Chat;
    let input_height = tui.chat_input.calculate_height(chat_area.width);
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(input_height)]).areas(chat_area);

    MessageList::new(
        &mut tui.message_list,
        app.chat.conversation().history(),
        app.chat.is_pending(),
    )
    .render(frame, messages_area);
    tui.chat_input.render(frame, input_area);
}

fn draw_login(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    LoginView {
        login_url: app.login_url.as_deref(),
        url_pending: app.login_url_pending,
        exchanging: app.gate.status() == AuthStatus::Authenticating,
        error: app.login_error.as_deref(),
        input: &mut tui.login_input,
    }
    .render(frame, area);
}
