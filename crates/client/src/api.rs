//! REST client shared by all service wrappers.
//!
//! Attaches the bearer credential when signed in. A 401 from any call ends
//! the session here, so callers only have to navigate to the sign-in page.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::session_store::SessionStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend rejected the credential; the session has been cleared.
    #[error("session expired; please sign in again")]
    Unauthorized,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("http client setup failed: {0}")]
    Client(String),
}

impl ApiError {
    /// Whether trying again might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Api { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn send<T>(&self, mut req: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        if let Some(credential) = self.session.credential() {
            req = req.bearer_auth(credential.expose());
        }

        let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.on_auth_rejected();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(&body, status);
            tracing::debug!(status = status.as_u16(), %message, "API call failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Prefer the backend's `message`, then `error`, then the status text.
fn error_message(body: &str, status: StatusCode) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
    });

    from_body.unwrap_or_else(|| status.canonical_reason().unwrap_or("An error occurred").to_string())
}
