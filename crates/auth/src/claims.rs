use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Credential, Session, SessionIdentity};

/// Body returned by the login and registration endpoints.
///
/// Only `user.role` matters for access decisions; the rest is display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: SessionIdentity,
    pub token: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthPayloadError {
    #[error("auth response carried no token")]
    MissingToken,

    #[error("auth response carried a blank user name")]
    BlankName,
}

impl AuthPayload {
    /// Turn a login/register response into a session.
    ///
    /// A response without a usable token never yields an identity: both are
    /// set together or not at all.
    pub fn into_session(self, now: DateTime<Utc>) -> Result<Session, AuthPayloadError> {
        let credential = Credential::new(self.token);
        if credential.is_blank() {
            return Err(AuthPayloadError::MissingToken);
        }
        if self.user.name.trim().is_empty() {
            return Err(AuthPayloadError::BlankName);
        }
        Ok(Session::new(self.user, credential, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn payload(token: &str) -> AuthPayload {
        serde_json::from_value(serde_json::json!({
            "user": { "role": "customer", "name": "Ana" },
            "token": token
        }))
        .unwrap()
    }

    #[test]
    fn payload_becomes_session() {
        let session = payload("tok").into_session(Utc::now()).unwrap();
        assert_eq!(session.role(), Role::Customer);
        assert_eq!(session.credential().expose(), "tok");
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_eq!(payload("  ").into_session(Utc::now()), Err(AuthPayloadError::MissingToken));
    }
}
