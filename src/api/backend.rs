//! Seams between the session state machine and the outside world.
//!
//! Each trait is one narrow capability of the backend. `BackendClient`
//! implements all of them over HTTP; tests substitute in-memory fakes.

use async_trait::async_trait;

use super::error::ApiError;
use super::types::{AuthGrant, ChatRequest, Credentials, FileEntry};

/// Lists folders of the remote file store.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Lists the children of `folder_id`, or of the store root when `None`.
    async fn list_files(
        &self,
        token: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<FileEntry>, ApiError>;
}

/// The assistant endpoint. One request, one complete reply.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn send_message(&self, token: &str, request: &ChatRequest) -> Result<String, ApiError>;
}

/// Identity provider handshake, proxied by the backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Asks for the provider's authorization URL for `redirect_uri`.
    async fn login_url(&self, redirect_uri: &str) -> Result<String, ApiError>;

    /// Trades an authorization code for a session token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<AuthGrant, ApiError>;
}

/// App-registration credentials for the file store.
#[async_trait]
pub trait CredentialsBackend: Send + Sync {
    /// `Ok(None)` when nothing has been configured yet.
    async fn get_credentials(&self, token: &str) -> Result<Option<Credentials>, ApiError>;

    async fn save_credentials(&self, token: &str, credentials: &Credentials)
    -> Result<(), ApiError>;
}

/// Everything the session needs from the backend.
pub trait Backend: FileStore + Assistant + AuthBackend + CredentialsBackend {}

impl<T> Backend for T where T: FileStore + Assistant + AuthBackend + CredentialsBackend {}
