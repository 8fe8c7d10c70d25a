//! # Application State
//!
//! Core business state for Docent. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── gate: SessionGate             // auth status + persisted token
//! ├── browser: FolderBrowser        // current folder, stack, listing
//! ├── selection: SelectionTracker   // grounding documents, by id
//! ├── chat: ChatController          // conversation + in-flight turn
//! ├── status_message: String        // status bar text
//! ├── last_error: Option<SessionError>
//! ├── login_url: Option<String>     // provider sign-in page
//! ├── login_url_pending: bool
//! ├── login_error: Option<String>   // shown on the login screen
//! └── redirect_uri: String          // where the provider sends the code
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::auth::SessionGate;
use crate::core::browser::FolderBrowser;
use crate::core::chat::ChatController;
use crate::core::config::ResolvedConfig;
use crate::core::error::SessionError;
use crate::core::selection::SelectionTracker;

pub const WELCOME_MESSAGE: &str = "Welcome to Docent!";

#[derive(Debug)]
pub struct App {
    pub gate: SessionGate,
    pub browser: FolderBrowser,
    pub selection: SelectionTracker,
    pub chat: ChatController,
    pub status_message: String,
    /// Most recent rejected operation or failed call, cleared on success.
    pub last_error: Option<SessionError>,
    pub login_url: Option<String>,
    pub login_url_pending: bool,
    pub login_error: Option<String>,
    pub redirect_uri: String,
}

impl App {
    pub fn new(gate: SessionGate, config: &ResolvedConfig) -> Self {
        Self::from_parts(
            gate,
            ChatController::with_failure_message(config.failure_message.clone()),
            config.redirect_uri.clone(),
        )
    }

    pub fn from_parts(gate: SessionGate, chat: ChatController, redirect_uri: String) -> Self {
        Self {
            gate,
            browser: FolderBrowser::new(),
            selection: SelectionTracker::new(),
            chat,
            status_message: String::from(WELCOME_MESSAGE),
            last_error: None,
            login_url: None,
            login_url_pending: false,
            login_error: None,
            redirect_uri,
        }
    }

    /// True when the login screen has nothing to show and nothing in flight.
    pub fn needs_login_url(&self) -> bool {
        !self.gate.is_authenticated()
            && self.login_url.is_none()
            && !self.login_url_pending
            && self.login_error.is_none()
    }

    /// Drops everything tied to the signed-in user.
    pub fn reset_session_components(&mut self) {
        self.browser.reset();
        self.selection.clear();
        self.chat.reset();
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{anonymous_app, test_app};

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, super::WELCOME_MESSAGE);
        assert!(app.gate.is_authenticated());
        assert!(app.selection.is_empty());
        assert!(app.chat.conversation().is_empty());
        assert!(!app.needs_login_url());
    }

    #[test]
    fn test_anonymous_app_needs_login_url() {
        let mut app = anonymous_app();
        assert!(app.needs_login_url());
        app.login_url_pending = true;
        assert!(!app.needs_login_url());
    }
}
