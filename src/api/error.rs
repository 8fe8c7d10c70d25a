use std::fmt;

/// Failures talking to the backend, before they are mapped onto session errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure (connection refused, DNS, TLS, reset mid-body).
    Network(String),
    /// The backend rejected the session token (401/403).
    Unauthorized,
    /// Any other non-success status. `message` is the body's `error` field, if any.
    Api { status: u16, message: Option<String> },
    /// The body was not the JSON shape we expected.
    Parse(String),
}

impl ApiError {
    /// The backend-provided message, when the response carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Unauthorized => write!(f, "session token rejected"),
            ApiError::Api {
                status,
                message: Some(message),
            } => write!(f, "backend error (HTTP {status}): {message}"),
            ApiError::Api {
                status,
                message: None,
            } => write!(f, "backend error (HTTP {status})"),
            ApiError::Parse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
