//! # Chat Session Controller
//!
//! Drives one logical turn at a time:
//!
//! ```text
//!          submit(text, selection)            complete(ticket, Ok | Err)
//!   Idle ─────────────────────────► Awaiting ────────────────────────────► Idle
//!    ▲  user turn appended,                     assistant turn appended
//!    │  ChatRequest handed out                  (reply or failure notice)
//!    └── submit while Awaiting ─► Busy, nothing appended, nothing sent
//! ```
//!
//! Exactly one request is outstanding per controller, so assistant turns
//! land in the same order their prompts were sent.

use log::{info, warn};

use crate::api::{ApiError, ChatRequest, FileEntry, Turn};
use crate::core::conversation::Conversation;
use crate::core::error::SessionError;

/// Shown in place of a reply when the assistant call fails for any reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Sorry, I encountered an error.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// A submitted turn whose request still has to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub ticket: u64,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered,
    /// The failure notice was appended. `unauthorized` is set when the
    /// backend rejected the session token.
    Failed { unauthorized: bool },
    /// No request with this ticket is outstanding; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct ChatController {
    conversation: Conversation,
    state: ChatState,
    outstanding: Option<u64>,
    last_ticket: u64,
    failure_message: String,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self::with_failure_message(DEFAULT_FAILURE_MESSAGE)
    }

    pub fn with_failure_message(message: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::new(),
            state: ChatState::Idle,
            outstanding: None,
            last_ticket: 0,
            failure_message: message.into(),
        }
    }

    /// Appends the user's turn and hands back the request to send.
    ///
    /// `context_files` should be a selection snapshot taken now; it is moved
    /// into the request, so later selection changes cannot alter it.
    pub fn submit(
        &mut self,
        text: &str,
        context_files: Vec<FileEntry>,
    ) -> Result<PendingTurn, SessionError> {
        if self.state == ChatState::AwaitingResponse {
            return Err(SessionError::Busy);
        }
        if text.trim().is_empty() {
            return Err(SessionError::InvalidOperation("message is empty"));
        }

        let history = self.conversation.history().to_vec();
        self.conversation.append(Turn::user(text));
        self.state = ChatState::AwaitingResponse;
        self.last_ticket += 1;
        self.outstanding = Some(self.last_ticket);

        info!(
            "Turn {} submitted: history_len={}, context_files={}",
            self.last_ticket,
            history.len(),
            context_files.len()
        );

        Ok(PendingTurn {
            ticket: self.last_ticket,
            request: ChatRequest {
                message: text.to_string(),
                history,
                context_files,
            },
        })
    }

    /// Records the assistant's answer, or the failure notice, for `ticket`.
    /// Failures are absorbed into the conversation rather than returned.
    pub fn complete(&mut self, ticket: u64, result: Result<String, ApiError>) -> TurnOutcome {
        if self.outstanding != Some(ticket) {
            warn!(
                "Ignoring reply for turn {} (outstanding {:?})",
                ticket, self.outstanding
            );
            return TurnOutcome::Stale;
        }
        self.outstanding = None;
        self.state = ChatState::Idle;

        match result {
            Ok(reply) => {
                info!("Turn {} answered ({} bytes)", ticket, reply.len());
                self.conversation.append(Turn::assistant(reply));
                TurnOutcome::Answered
            }
            Err(err) => {
                warn!("Turn {} failed: {}", ticket, err);
                self.conversation
                    .append(Turn::assistant(self.failure_message.clone()));
                TurnOutcome::Failed {
                    unauthorized: err == ApiError::Unauthorized,
                }
            }
        }
    }

    /// Drops the conversation and any outstanding turn.
    pub fn reset(&mut self) {
        self.conversation = Conversation::new();
        self.state = ChatState::Idle;
        self.outstanding = None;
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ChatState::AwaitingResponse
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn failure_message(&self) -> &str {
        &self.failure_message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Role;

    #[test]
    fn test_submit_appends_user_turn_immediately() {
        let mut chat = ChatController::new();
        let pending = chat.submit("hello", vec![]).unwrap();

        assert_eq!(chat.state(), ChatState::AwaitingResponse);
        assert_eq!(chat.conversation().history(), &[Turn::user("hello")]);
        assert_eq!(pending.request.message, "hello");
        assert!(pending.request.history.is_empty());
    }

    #[test]
    fn test_history_excludes_current_message() {
        let mut chat = ChatController::new();
        let first = chat.submit("one", vec![]).unwrap();
        chat.complete(first.ticket, Ok("reply one".to_string()));

        let second = chat.submit("two", vec![]).unwrap();
        assert_eq!(
            second.request.history,
            vec![Turn::user("one"), Turn::assistant("reply one")]
        );
        assert_eq!(second.request.message, "two");
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let mut chat = ChatController::new();
        assert_eq!(
            chat.submit("   \n\t", vec![]),
            Err(SessionError::InvalidOperation("message is empty"))
        );
        assert!(chat.conversation().is_empty());
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[test]
    fn test_submit_while_awaiting_is_busy() {
        let mut chat = ChatController::new();
        chat.submit("first", vec![]).unwrap();

        assert_eq!(chat.submit("second", vec![]), Err(SessionError::Busy));
        assert_eq!(chat.conversation().len(), 1);
    }

    #[test]
    fn test_success_appends_reply_in_order() {
        let mut chat = ChatController::new();
        let pending = chat.submit("U1", vec![]).unwrap();
        let outcome = chat.complete(pending.ticket, Ok("A1".to_string()));

        assert_eq!(outcome, TurnOutcome::Answered);
        assert_eq!(
            chat.conversation().history(),
            &[Turn::user("U1"), Turn::assistant("A1")]
        );
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[test]
    fn test_failure_appends_notice() {
        let mut chat = ChatController::new();
        let pending = chat.submit("U1", vec![]).unwrap();
        let outcome = chat.complete(
            pending.ticket,
            Err(ApiError::Api {
                status: 500,
                message: None,
            }),
        );

        assert_eq!(outcome, TurnOutcome::Failed { unauthorized: false });
        assert_eq!(
            chat.conversation().history(),
            &[Turn::user("U1"), Turn::assistant(DEFAULT_FAILURE_MESSAGE)]
        );
        assert!(!chat.is_pending());
    }

    #[test]
    fn test_unauthorized_failure_is_flagged() {
        let mut chat = ChatController::new();
        let pending = chat.submit("U1", vec![]).unwrap();
        let outcome = chat.complete(pending.ticket, Err(ApiError::Unauthorized));
        assert_eq!(outcome, TurnOutcome::Failed { unauthorized: true });
        assert_eq!(chat.conversation().last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_stale_reply_after_reset_is_ignored() {
        let mut chat = ChatController::new();
        let old = chat.submit("before logout", vec![]).unwrap();
        chat.reset();
        let new = chat.submit("after login", vec![]).unwrap();

        assert_eq!(chat.complete(old.ticket, Ok("late".to_string())), TurnOutcome::Stale);
        assert!(chat.is_pending());
        assert_eq!(chat.complete(new.ticket, Ok("fresh".to_string())), TurnOutcome::Answered);
        assert_eq!(
            chat.conversation().history(),
            &[Turn::user("after login"), Turn::assistant("fresh")]
        );
    }

    #[test]
    fn test_context_files_travel_with_request() {
        let mut chat = ChatController::new();
        let files = vec![FileEntry::file("a", "a.txt")];
        let pending = chat.submit("summarise", files.clone()).unwrap();
        assert_eq!(pending.request.context_files, files);
    }

    #[test]
    fn test_custom_failure_message() {
        let mut chat = ChatController::with_failure_message("Oops.");
        let pending = chat.submit("hi", vec![]).unwrap();
        chat.complete(pending.ticket, Err(ApiError::Network("down".to_string())));
        assert_eq!(chat.conversation().last().unwrap().content, "Oops.");
    }
}
