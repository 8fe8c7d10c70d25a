//! # Actions
//!
//! Everything that can happen in Docent becomes an `Action`.
//! User opens a folder? That's `Action::Descend(entry)`.
//! Backend answers? That's `Action::ReplyReceived { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O to run next. No
//! I/O happens here; effects carry owned data (token, request, ticket) so
//! they can be performed on another task while the state stays put.
//!
//! ```text
//! State + Action  →  update()  →  Effect  →  perform()  →  Action ...
//! ```

use log::{debug, info, warn};

use crate::api::{ApiError, AuthGrant, FileEntry};
use crate::core::browser::{ListingOutcome, ListingRequest};
use crate::core::chat::{PendingTurn, TurnOutcome};
use crate::core::error::SessionError;
use crate::core::state::App;

pub const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

#[derive(Debug, Clone)]
pub enum Action {
    // Browser
    OpenRoot,
    Descend(FileEntry),
    Back,
    Refresh,
    // Selection
    ToggleSelection(FileEntry),
    ClearSelection,
    // Chat
    Submit(String),
    // Session
    BeginLogin,
    CompleteLogin(String),
    Logout,
    Quit,
    // Completions of effects
    ListingLoaded {
        ticket: u64,
        result: Result<Vec<FileEntry>, ApiError>,
    },
    ReplyReceived {
        ticket: u64,
        result: Result<String, ApiError>,
    },
    LoginUrlReady(Result<String, ApiError>),
    ExchangeFinished(Result<AuthGrant, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    FetchListing {
        token: String,
        request: ListingRequest,
    },
    SendMessage {
        token: String,
        turn: PendingTurn,
    },
    FetchLoginUrl {
        redirect_uri: String,
    },
    ExchangeCode {
        code: String,
        redirect_uri: String,
    },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::OpenRoot => with_token(app, |app, token| Effect::FetchListing {
            token,
            request: app.browser.home(),
        }),
        Action::Descend(entry) => with_token(app, |app, token| {
            match app.browser.descend(&entry) {
                Ok(request) => Effect::FetchListing { token, request },
                Err(e) => reject(app, e),
            }
        }),
        Action::Back => with_token(app, |app, token| match app.browser.back() {
            Ok(Some(request)) => Effect::FetchListing { token, request },
            Ok(None) => Effect::None,
            Err(e) => reject(app, e),
        }),
        Action::Refresh => with_token(app, |app, token| Effect::FetchListing {
            token,
            request: app.browser.refresh(),
        }),

        Action::ToggleSelection(entry) => match app.selection.toggle(&entry) {
            Ok(selected) => {
                app.last_error = None;
                app.status_message = if selected {
                    format!("Attached {}", entry.name)
                } else {
                    format!("Detached {}", entry.name)
                };
                Effect::None
            }
            Err(e) => reject(app, e),
        },
        Action::ClearSelection => {
            app.selection.clear();
            app.status_message = String::from("Selection cleared");
            Effect::None
        }

        Action::Submit(text) => with_token(app, |app, token| {
            match app.chat.submit(&text, app.selection.snapshot()) {
                Ok(turn) => {
                    app.last_error = None;
                    app.status_message = String::from("Thinking...");
                    Effect::SendMessage { token, turn }
                }
                Err(e) => reject(app, e),
            }
        }),

        Action::BeginLogin => {
            if app.gate.is_authenticated() {
                return reject(app, SessionError::InvalidOperation("already signed in"));
            }
            if app.login_url_pending {
                return Effect::None;
            }
            app.login_url_pending = true;
            app.login_error = None;
            Effect::FetchLoginUrl {
                redirect_uri: app.redirect_uri.clone(),
            }
        }
        Action::CompleteLogin(input) => match app.gate.begin_exchange(&input) {
            Ok(code) => {
                app.login_error = None;
                app.status_message = String::from("Signing in...");
                Effect::ExchangeCode {
                    code,
                    redirect_uri: app.redirect_uri.clone(),
                }
            }
            Err(e) => {
                if let SessionError::ExchangeFailure(msg) = &e {
                    app.login_error = Some(msg.clone());
                }
                reject(app, e)
            }
        },
        Action::Logout => {
            app.gate.logout();
            app.reset_session_components();
            app.login_url = None;
            app.login_error = None;
            app.last_error = None;
            app.status_message = String::from("Signed out");
            Effect::None
        }
        Action::Quit => Effect::Quit,

        Action::ListingLoaded { ticket, result } => {
            match app.browser.apply_listing(ticket, result) {
                Ok(ListingOutcome::Loaded { entries }) => {
                    app.last_error = None;
                    app.status_message = format!("{} items", entries);
                    Effect::None
                }
                Ok(ListingOutcome::Superseded) => Effect::None,
                Err(SessionError::Unauthenticated) => force_sign_out(app),
                Err(e) => reject(app, e),
            }
        }
        Action::ReplyReceived { ticket, result } => match app.chat.complete(ticket, result) {
            TurnOutcome::Answered => {
                app.status_message = String::from("Ready");
                Effect::None
            }
            TurnOutcome::Failed { unauthorized: true } => force_sign_out(app),
            TurnOutcome::Failed { unauthorized: false } => {
                app.status_message = String::from("The assistant request failed");
                Effect::None
            }
            TurnOutcome::Stale => Effect::None,
        },
        Action::LoginUrlReady(result) => {
            app.login_url_pending = false;
            match result {
                Ok(url) => {
                    info!("Login URL ready");
                    app.login_url = Some(url);
                }
                Err(e) => {
                    warn!("Could not fetch login URL: {}", e);
                    app.login_error = Some(
                        e.backend_message()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Could not reach the sign-in service: {e}")),
                    );
                }
            }
            Effect::None
        }
        Action::ExchangeFinished(result) => match app.gate.finish_exchange(result) {
            Ok(()) => {
                app.reset_session_components();
                app.login_url = None;
                app.login_error = None;
                app.last_error = None;
                app.status_message = format!(
                    "Signed in as {}",
                    app.gate.username().unwrap_or("unknown user")
                );
                update(app, Action::OpenRoot)
            }
            Err(SessionError::ExchangeFailure(msg)) => {
                app.login_error = Some(msg.clone());
                reject(app, SessionError::ExchangeFailure(msg))
            }
            Err(e) => {
                debug!("Ignoring exchange result: {}", e);
                Effect::None
            }
        },
    }
}

/// Runs `f` with the session token, or rejects with `Unauthenticated`.
fn with_token(app: &mut App, f: impl FnOnce(&mut App, String) -> Effect) -> Effect {
    match app.gate.token() {
        Ok(token) => {
            let token = token.to_string();
            f(app, token)
        }
        Err(e) => reject(app, e),
    }
}

fn reject(app: &mut App, err: SessionError) -> Effect {
    debug!("Rejected: {}", err);
    app.status_message = err.to_string();
    app.last_error = Some(err);
    Effect::None
}

/// The backend refused our token: drop the session and everything tied to it.
fn force_sign_out(app: &mut App) -> Effect {
    warn!("Backend rejected the session token, signing out");
    app.gate.logout();
    app.reset_session_components();
    app.login_url = None;
    app.login_error = Some(SESSION_EXPIRED.to_string());
    app.last_error = Some(SessionError::Unauthenticated);
    app.status_message = String::from(SESSION_EXPIRED);
    Effect::None
}
