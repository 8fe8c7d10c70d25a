//! HTTP client for the docent backend.
//!
//! Every authenticated call carries the session token in the `Authorization`
//! header (`Token <key>` by default, which is what Django REST framework's
//! token authentication expects). Status mapping happens in one place,
//! [`BackendClient::check`], so every endpoint reports failures the same way.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::backend::{Assistant, AuthBackend, CredentialsBackend, FileStore};
use super::error::ApiError;
use super::types::{
    AuthGrant, ChatRequest, ChatResponse, Credentials, ErrorBody, ExchangeRequest, FileEntry,
    ListingResponse, LoginUrlResponse,
};
use crate::core::config::ResolvedConfig;

pub const DEFAULT_AUTH_SCHEME: &str = "Token";

/// Backend client over reqwest. Cheap to clone; shares one connection pool.
#[derive(Clone, Debug)]
pub struct BackendClient {
    base_url: String,
    auth_scheme: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Overrides the `Authorization` scheme, e.g. `Bearer`.
    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.base_url.clone()).with_auth_scheme(config.auth_scheme.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("{} {}", self.auth_scheme, token))
    }

    async fn execute(request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    /// Maps non-success statuses onto `ApiError`, passing successes through.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        debug!("Backend response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Backend rejected session token (HTTP {})", status.as_u16());
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Backend error: {} - {} bytes", status.as_u16(), body.len());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error);
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!("Backend body: {} bytes", body.len());
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl FileStore for BackendClient {
    async fn list_files(
        &self,
        token: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<FileEntry>, ApiError> {
        let mut request = self.client.get(self.url("/sharepoint/files"));
        if let Some(id) = folder_id {
            request = request.query(&[("folder_id", id)]);
        }
        info!("Listing folder {:?}", folder_id);

        let response = Self::check(Self::execute(self.authorized(request, token)).await?).await?;
        let listing: ListingResponse = Self::decode(response).await?;
        info!("Listing returned {} entries", listing.files.len());
        Ok(listing.files)
    }
}

#[async_trait]
impl Assistant for BackendClient {
    async fn send_message(&self, token: &str, request: &ChatRequest) -> Result<String, ApiError> {
        info!(
            "Sending message: history_len={}, context_files={}",
            request.history.len(),
            request.context_files.len()
        );
        let builder = self.client.post(self.url("/message")).json(request);
        let response = Self::check(Self::execute(self.authorized(builder, token)).await?).await?;
        let reply: ChatResponse = Self::decode(response).await?;
        Ok(reply.response)
    }
}

#[async_trait]
impl AuthBackend for BackendClient {
    async fn login_url(&self, redirect_uri: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .get(self.url("/auth/ms-url/"))
            .query(&[("redirect_uri", redirect_uri)]);
        let response = Self::check(Self::execute(request).await?).await?;
        let body: LoginUrlResponse = Self::decode(response).await?;
        body.url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::Parse("response carried no login URL".to_string()))
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<AuthGrant, ApiError> {
        info!("Exchanging authorization code");
        let request = self
            .client
            .post(self.url("/auth/callback/"))
            .json(&ExchangeRequest { code, redirect_uri });
        let response = Self::check(Self::execute(request).await?).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl CredentialsBackend for BackendClient {
    async fn get_credentials(&self, token: &str) -> Result<Option<Credentials>, ApiError> {
        let request = self.client.get(self.url("/auth/credentials/"));
        let response = Self::execute(self.authorized(request, token)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("No credentials configured");
            return Ok(None);
        }
        let response = Self::check(response).await?;
        Self::decode(response).await.map(Some)
    }

    async fn save_credentials(
        &self,
        token: &str,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/auth/credentials/"))
            .json(credentials);
        Self::check(Self::execute(self.authorized(request, token)).await?).await?;
        info!("Credentials saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8000/api/");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url("/message"),
            "http://localhost:8000/api/message"
        );
    }

    #[test]
    fn test_default_scheme_is_token() {
        let client = BackendClient::new("http://x");
        assert_eq!(client.auth_scheme, DEFAULT_AUTH_SCHEME);
        let client = client.with_auth_scheme("Bearer");
        assert_eq!(client.auth_scheme, "Bearer");
    }
}
