//! Login, registration and logout against the backend.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use bookacut_auth::{AuthPayload, AuthPayloadError, SessionIdentity};
use bookacut_core::DomainClass;
use bookacut_routing::landing_path;

use crate::api::{ApiClient, ApiError};
use crate::session_store::SessionStore;
use crate::storage::StorageError;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Customer self-registration on a client domain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Payload(#[from] AuthPayloadError),

    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

/// Establishes and ends sessions; the session store does the bookkeeping.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    /// Sign in and return the identity plus where it lands on `domain`.
    pub async fn login(
        &self,
        request: &LoginRequest,
        domain: DomainClass,
    ) -> Result<(SessionIdentity, &'static str), AuthError> {
        let payload: AuthPayload = self.api.post_json(LOGIN_ENDPOINT, request).await?;
        self.establish(payload, domain)
    }

    pub async fn register(
        &self,
        request: &RegisterRequest,
        domain: DomainClass,
    ) -> Result<(SessionIdentity, &'static str), AuthError> {
        let payload: AuthPayload = self.api.post_json(REGISTER_ENDPOINT, request).await?;
        self.establish(payload, domain)
    }

    /// Local only; the backend keeps no session to end.
    pub fn logout(&self) -> Result<&'static str, AuthError> {
        self.session.logout()?;
        Ok(bookacut_routing::LOGIN_PATH)
    }

    fn establish(
        &self,
        payload: AuthPayload,
        domain: DomainClass,
    ) -> Result<(SessionIdentity, &'static str), AuthError> {
        let session = payload.into_session(Utc::now())?;
        let identity = session.identity().clone();
        self.session.set_auth(session)?;

        let landing = landing_path(Some(&identity), domain);
        if identity.role.domain_class() != domain {
            tracing::warn!(role = %identity.role, %domain, "signed in on a domain that does not serve this role");
        }
        Ok((identity, landing))
    }
}
