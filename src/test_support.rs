//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    ApiError, Assistant, AuthBackend, AuthGrant, ChatRequest, Credentials, CredentialsBackend,
    FileEntry, FileStore,
};
use crate::core::auth::{SessionGate, TOKEN_KEY, USERNAME_KEY};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::core::store::MemoryStore;

/// Scripted in-memory backend. Each call pops the next scripted result,
/// falling back to a benign default, and records what it was asked.
#[derive(Default)]
pub struct FakeBackend {
    listings: Mutex<VecDeque<Result<Vec<FileEntry>, ApiError>>>,
    replies: Mutex<VecDeque<Result<String, ApiError>>>,
    exchanges: Mutex<VecDeque<Result<AuthGrant, ApiError>>>,
    credentials: Mutex<VecDeque<Result<Option<Credentials>, ApiError>>>,
    listed: Mutex<Vec<Option<String>>>,
    tokens: Mutex<Vec<String>>,
    requests: Mutex<Vec<ChatRequest>>,
    codes: Mutex<Vec<String>>,
    saved: Mutex<Vec<Credentials>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_listing(&self, result: Result<Vec<FileEntry>, ApiError>) {
        self.listings.lock().unwrap().push_back(result);
    }

    pub fn push_reply(&self, result: Result<String, ApiError>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn push_exchange(&self, result: Result<AuthGrant, ApiError>) {
        self.exchanges.lock().unwrap().push_back(result);
    }

    pub fn push_credentials(&self, result: Result<Option<Credentials>, ApiError>) {
        self.credentials.lock().unwrap().push_back(result);
    }

    pub fn listed_folders(&self) -> Vec<Option<String>> {
        self.listed.lock().unwrap().clone()
    }

    /// Tokens presented to authenticated endpoints, in call order.
    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn sent_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.codes.lock().unwrap().clone()
    }

    pub fn saved_credentials(&self) -> Vec<Credentials> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStore for FakeBackend {
    async fn list_files(
        &self,
        token: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<FileEntry>, ApiError> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.listed.lock().unwrap().push(folder_id.map(str::to_string));
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }
}

#[async_trait]
impl Assistant for FakeBackend {
    async fn send_message(&self, token: &str, request: &ChatRequest) -> Result<String, ApiError> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn login_url(&self, redirect_uri: &str) -> Result<String, ApiError> {
        Ok(format!(
            "https://login.example/authorize?redirect_uri={redirect_uri}"
        ))
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<AuthGrant, ApiError> {
        self.codes.lock().unwrap().push(code.to_string());
        self.exchanges.lock().unwrap().pop_front().unwrap_or(Err(ApiError::Api {
            status: 400,
            message: Some("no exchange scripted".to_string()),
        }))
    }
}

#[async_trait]
impl CredentialsBackend for FakeBackend {
    async fn get_credentials(&self, token: &str) -> Result<Option<Credentials>, ApiError> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.credentials.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn save_credentials(
        &self,
        token: &str,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        self.tokens.lock().unwrap().push(token.to_string());
        self.saved.lock().unwrap().push(credentials.clone());
        Ok(())
    }
}

/// Creates a signed-in test App (token `test-token`, user `tester`).
pub fn test_app() -> App {
    let store = MemoryStore::with_entries([(TOKEN_KEY, "test-token"), (USERNAME_KEY, "tester")]);
    App::new(
        SessionGate::restore(Box::new(store)),
        &ResolvedConfig::default(),
    )
}

/// Creates a signed-out test App.
pub fn anonymous_app() -> App {
    App::new(
        SessionGate::restore(Box::new(MemoryStore::new())),
        &ResolvedConfig::default(),
    )
}
