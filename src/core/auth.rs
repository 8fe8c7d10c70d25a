//! # Session Gate
//!
//! Owns the session token and the only handle on the persisted store.
//!
//! ```text
//!              begin_exchange(code)             finish_exchange(Ok)
//!  Anonymous ───────────────────────► Authenticating ──────────────────► Authenticated
//!      ▲                                     │                                 │
//!      └────────── finish_exchange(Err) ─────┘                                 │
//!      └───────────────────────────── logout ──────────────────────────────────┘
//! ```
//!
//! Token and username are written on entry to `Authenticated` and removed
//! on entry to `Anonymous`. Nothing else touches the store.

use log::{error, info, warn};

use crate::api::{ApiError, AuthBackend, AuthGrant};
use crate::core::error::SessionError;
use crate::core::store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";

/// Shown when the exchange fails and the backend gave no message.
pub const DEFAULT_EXCHANGE_FAILURE: &str = "Authentication failed.";
pub const MISSING_CODE: &str = "No authorization code found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status: AuthStatus,
    pub token: Option<String>,
    pub username: Option<String>,
}

impl SessionState {
    fn anonymous() -> Self {
        Self {
            status: AuthStatus::Anonymous,
            token: None,
            username: None,
        }
    }
}

pub struct SessionGate {
    state: SessionState,
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("status", &self.state.status)
            .field("username", &self.state.username)
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    /// Reads the persisted session. A stored token means signed in.
    pub fn restore(store: Box<dyn KeyValueStore>) -> Self {
        let state = match store.get(TOKEN_KEY).filter(|t| !t.is_empty()) {
            Some(token) => {
                let username = store.get(USERNAME_KEY);
                info!("Restored session for {:?}", username);
                SessionState {
                    status: AuthStatus::Authenticated,
                    token: Some(token),
                    username,
                }
            }
            None => SessionState::anonymous(),
        };
        Self { state, store }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> AuthStatus {
        self.state.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.status == AuthStatus::Authenticated
    }

    pub fn username(&self) -> Option<&str> {
        self.state.username.as_deref()
    }

    /// The session token, or `Unauthenticated` outside `Authenticated`.
    pub fn token(&self) -> Result<&str, SessionError> {
        match (&self.state.status, &self.state.token) {
            (AuthStatus::Authenticated, Some(token)) => Ok(token),
            _ => Err(SessionError::Unauthenticated),
        }
    }

    /// Enters `Authenticating` and returns the code to exchange.
    ///
    /// Accepts either the bare code or the whole redirect URL the provider
    /// sent the browser to.
    pub fn begin_exchange(&mut self, code_or_url: &str) -> Result<String, SessionError> {
        match self.state.status {
            AuthStatus::Anonymous => {}
            AuthStatus::Authenticating => return Err(SessionError::Busy),
            AuthStatus::Authenticated => {
                return Err(SessionError::InvalidOperation("already signed in"));
            }
        }
        let code = extract_code(code_or_url)
            .ok_or_else(|| SessionError::ExchangeFailure(MISSING_CODE.to_string()))?;
        self.state.status = AuthStatus::Authenticating;
        info!("Exchanging authorization code");
        Ok(code)
    }

    /// Settles an exchange started by `begin_exchange`.
    pub fn finish_exchange(
        &mut self,
        result: Result<AuthGrant, ApiError>,
    ) -> Result<(), SessionError> {
        if self.state.status != AuthStatus::Authenticating {
            warn!("Exchange result arrived in state {:?}", self.state.status);
            return Err(SessionError::InvalidOperation("no sign-in in progress"));
        }

        match result {
            Ok(grant) => {
                if let Err(e) = self.persist(&grant) {
                    error!("Failed to persist session: {}", e);
                    self.clear_store();
                }
                info!("Signed in as {}", grant.username);
                self.state = SessionState {
                    status: AuthStatus::Authenticated,
                    token: Some(grant.token),
                    username: Some(grant.username),
                };
                Ok(())
            }
            Err(err) => {
                warn!("Exchange failed: {}", err);
                self.state = SessionState::anonymous();
                let message = err
                    .backend_message()
                    .unwrap_or(DEFAULT_EXCHANGE_FAILURE)
                    .to_string();
                Err(SessionError::ExchangeFailure(message))
            }
        }
    }

    /// Runs a complete exchange against `backend`.
    pub async fn complete_login(
        &mut self,
        backend: &dyn AuthBackend,
        code_or_url: &str,
        redirect_uri: &str,
    ) -> Result<(), SessionError> {
        let code = self.begin_exchange(code_or_url)?;
        let result = backend.exchange_code(&code, redirect_uri).await;
        self.finish_exchange(result)
    }

    /// Forgets the session, in memory and on disk. Safe to call repeatedly.
    pub fn logout(&mut self) {
        if self.state.status != AuthStatus::Anonymous {
            info!("Signing out {:?}", self.state.username);
        }
        self.state = SessionState::anonymous();
        self.clear_store();
    }

    fn persist(&mut self, grant: &AuthGrant) -> Result<(), crate::core::store::StoreError> {
        self.store.set(TOKEN_KEY, &grant.token)?;
        self.store.set(USERNAME_KEY, &grant.username)
    }

    fn clear_store(&mut self) {
        for key in [TOKEN_KEY, USERNAME_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to clear {} from store: {}", key, e);
            }
        }
    }
}

/// Pulls the authorization code out of `input`: the `code` query parameter
/// when it is a URL, otherwise the trimmed input itself.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match reqwest::Url::parse(input) {
        Ok(url) if url.has_host() => url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|code| !code.is_empty()),
        _ => Some(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::test_support::FakeBackend;
    use std::sync::{Arc, Mutex};

    /// Store that can be inspected after the gate takes ownership.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), crate::core::store::StoreError> {
            self.0.lock().unwrap().set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), crate::core::store::StoreError> {
            self.0.lock().unwrap().remove(key)
        }
    }

    fn grant() -> AuthGrant {
        AuthGrant {
            token: "tok-1".to_string(),
            username: "ada@contoso.com".to_string(),
        }
    }

    #[test]
    fn test_restore_with_token_is_authenticated() {
        let store = MemoryStore::with_entries([(TOKEN_KEY, "abc"), (USERNAME_KEY, "ada")]);
        let gate = SessionGate::restore(Box::new(store));
        assert_eq!(gate.status(), AuthStatus::Authenticated);
        assert_eq!(gate.token(), Ok("abc"));
        assert_eq!(gate.username(), Some("ada"));
    }

    #[test]
    fn test_restore_without_token_is_anonymous() {
        let gate = SessionGate::restore(Box::new(MemoryStore::new()));
        assert_eq!(gate.status(), AuthStatus::Anonymous);
        assert_eq!(gate.token(), Err(SessionError::Unauthenticated));
    }

    #[test]
    fn test_successful_exchange_persists_and_authenticates() {
        let store = SharedStore::default();
        let mut gate = SessionGate::restore(Box::new(store.clone()));

        let code = gate.begin_exchange("abc123").unwrap();
        assert_eq!(code, "abc123");
        assert_eq!(gate.status(), AuthStatus::Authenticating);
        assert_eq!(gate.token(), Err(SessionError::Unauthenticated));

        gate.finish_exchange(Ok(grant())).unwrap();
        assert_eq!(gate.status(), AuthStatus::Authenticated);
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("tok-1"));
        assert_eq!(store.get(USERNAME_KEY).as_deref(), Some("ada@contoso.com"));
    }

    #[test]
    fn test_bad_code_leaves_anonymous_and_surfaces_backend_message() {
        let store = SharedStore::default();
        let mut gate = SessionGate::restore(Box::new(store.clone()));
        let backend = FakeBackend::new();
        backend.push_exchange(Err(ApiError::Api {
            status: 400,
            message: Some("invalid_grant".to_string()),
        }));

        let result = tokio_test::block_on(gate.complete_login(
            &backend,
            "bad-code",
            "http://localhost:3000/auth/callback",
        ));

        assert_eq!(
            result,
            Err(SessionError::ExchangeFailure("invalid_grant".to_string()))
        );
        assert_eq!(gate.status(), AuthStatus::Anonymous);
        assert_eq!(store.get(TOKEN_KEY), None);
        assert_eq!(store.get(USERNAME_KEY), None);
        assert_eq!(backend.exchanged_codes(), vec!["bad-code".to_string()]);
    }

    #[test]
    fn test_exchange_failure_without_message_uses_default() {
        let mut gate = SessionGate::restore(Box::new(MemoryStore::new()));
        gate.begin_exchange("x").unwrap();
        let result = gate.finish_exchange(Err(ApiError::Network("refused".to_string())));
        assert_eq!(
            result,
            Err(SessionError::ExchangeFailure(DEFAULT_EXCHANGE_FAILURE.to_string()))
        );
    }

    #[test]
    fn test_begin_exchange_preconditions() {
        let mut gate = SessionGate::restore(Box::new(MemoryStore::new()));
        gate.begin_exchange("one").unwrap();
        assert_eq!(gate.begin_exchange("two"), Err(SessionError::Busy));

        gate.finish_exchange(Ok(grant())).unwrap();
        assert!(matches!(
            gate.begin_exchange("three"),
            Err(SessionError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_missing_code_does_not_start_exchange() {
        let mut gate = SessionGate::restore(Box::new(MemoryStore::new()));
        assert_eq!(
            gate.begin_exchange("http://localhost:3000/auth/callback?state=1"),
            Err(SessionError::ExchangeFailure(MISSING_CODE.to_string()))
        );
        assert_eq!(gate.status(), AuthStatus::Anonymous);
    }

    #[test]
    fn test_late_exchange_result_is_rejected() {
        let mut gate = SessionGate::restore(Box::new(MemoryStore::new()));
        assert!(gate.finish_exchange(Ok(grant())).is_err());
        assert_eq!(gate.status(), AuthStatus::Anonymous);
    }

    #[test]
    fn test_logout_clears_store_and_is_idempotent() {
        let store = SharedStore::default();
        let mut gate = SessionGate::restore(Box::new(store.clone()));
        gate.begin_exchange("abc").unwrap();
        gate.finish_exchange(Ok(grant())).unwrap();

        gate.logout();
        gate.logout();

        assert_eq!(gate.status(), AuthStatus::Anonymous);
        assert_eq!(gate.username(), None);
        assert_eq!(store.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_extract_code_from_redirect_url() {
        assert_eq!(
            extract_code("http://localhost:3000/auth/callback?code=M.abc%2F1&state=x").as_deref(),
            Some("M.abc/1")
        );
        assert_eq!(extract_code("  raw-code \n").as_deref(), Some("raw-code"));
        assert_eq!(extract_code("http://localhost:3000/auth/callback?code="), None);
        assert_eq!(extract_code(""), None);
    }
}
