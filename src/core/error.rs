use std::fmt;

use crate::api::ApiError;

/// Errors surfaced by the session components.
///
/// Remote failures are converted into one of these at the component
/// boundary; raw transport errors never reach conversation, selection or
/// navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation needs a signed-in session, or the backend rejected the token.
    Unauthenticated,
    /// A listing or credential fetch failed. Prior state is left intact.
    FetchFailure(String),
    /// Usage error (toggling a folder, submitting empty text). No state change.
    InvalidOperation(&'static str),
    /// A request on the same component (chat turn, listing, code exchange)
    /// is still outstanding.
    Busy,
    /// The authorization-code exchange failed. Nothing was persisted.
    ExchangeFailure(String),
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => SessionError::Unauthenticated,
            other => SessionError::FetchFailure(other.to_string()),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Unauthenticated => write!(f, "sign-in required"),
            SessionError::FetchFailure(msg) => write!(f, "failed to load: {msg}"),
            SessionError::InvalidOperation(msg) => write!(f, "{msg}"),
            SessionError::Busy => write!(f, "still waiting for the previous request"),
            SessionError::ExchangeFailure(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SessionError {}
