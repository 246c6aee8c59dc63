//! Session state holder.
//!
//! One instance per running client, constructed explicitly and shared by
//! `Arc`. It is the only writer of the persisted `user`/`token` entries.

use std::sync::{Arc, RwLock};

use chrono::Utc;

use bookacut_auth::{Credential, IdentityPatch, Session, SessionIdentity};
use bookacut_routing::LOGIN_PATH;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the serialized identity.
pub const USER_KEY: &str = "user";
/// Storage key of the bearer credential.
pub const TOKEN_KEY: &str = "token";

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.session())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Rehydrate from storage.
    ///
    /// Both entries must be present and readable; anything else starts signed
    /// out and clears whatever half-state was left behind.
    pub fn hydrate(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = match read_session(storage.as_ref()) {
            Ok(Some(session)) => {
                tracing::info!(role = %session.role(), "session restored");
                Some(session)
            }
            Ok(None) => None,
            Err(reason) => {
                tracing::warn!(%reason, "discarding persisted session");
                clear_keys(storage.as_ref());
                None
            }
        };

        Self {
            storage,
            current: RwLock::new(session),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.session().map(|s| s.identity().clone())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.session().map(|s| s.credential().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Store a freshly authenticated session (login/registration).
    pub fn set_auth(&self, session: Session) -> Result<(), StorageError> {
        let user = encode_identity(session.identity())?;

        self.storage.set(USER_KEY, &user)?;
        if let Err(e) = self.storage.set(TOKEN_KEY, session.credential().expose()) {
            // Never leave an identity persisted without its credential.
            if let Err(rollback) = self.storage.remove(USER_KEY) {
                tracing::warn!(error = %rollback, "failed to roll back persisted identity");
            }
            return Err(e);
        }

        tracing::info!(role = %session.role(), "session established");
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    /// Merge a profile update into the signed-in identity.
    ///
    /// Returns the updated identity, or `None` when signed out (no-op).
    pub fn update_identity(&self, patch: IdentityPatch) -> Result<Option<SessionIdentity>, StorageError> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let Some(session) = current.as_mut() else {
            return Ok(None);
        };

        let mut updated = session.identity().clone();
        updated.apply(patch);
        self.storage.set(USER_KEY, &encode_identity(&updated)?)?;

        *session.identity_mut() = updated.clone();
        Ok(Some(updated))
    }

    /// Sign out: memory first, then storage.
    pub fn logout(&self) -> Result<(), StorageError> {
        let previous = self.current.write().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(session) = previous {
            tracing::info!(role = %session.role(), "session cleared");
        }

        let user = self.storage.remove(USER_KEY);
        let token = self.storage.remove(TOKEN_KEY);
        user.and(token)
    }

    /// The backend rejected our credential: drop the session and send the
    /// user to sign in again. Storage failures are logged, not surfaced.
    pub fn on_auth_rejected(&self) -> &'static str {
        tracing::warn!("credential rejected by backend; signing out");
        if let Err(e) = self.logout() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        LOGIN_PATH
    }
}

fn encode_identity(identity: &SessionIdentity) -> Result<String, StorageError> {
    serde_json::to_string(identity).map_err(|e| StorageError::Corrupt(e.to_string()))
}

fn read_session(storage: &dyn KeyValueStore) -> Result<Option<Session>, String> {
    let user = storage.get(USER_KEY).map_err(|e| e.to_string())?;
    let token = storage.get(TOKEN_KEY).map_err(|e| e.to_string())?;

    match (user, token) {
        (None, None) => Ok(None),
        (Some(user), Some(token)) => {
            let identity: SessionIdentity =
                serde_json::from_str(&user).map_err(|e| format!("unreadable identity: {e}"))?;
            let credential = Credential::new(token);
            if credential.is_blank() {
                return Err("blank credential".to_string());
            }
            Ok(Some(Session::new(identity, credential, Utc::now())))
        }
        (Some(_), None) => Err("identity without credential".to_string()),
        (None, Some(_)) => Err("credential without identity".to_string()),
    }
}

fn clear_keys(storage: &dyn KeyValueStore) {
    for key in [USER_KEY, TOKEN_KEY] {
        if let Err(e) = storage.remove(key) {
            tracing::warn!(key, error = %e, "failed to clear storage entry");
        }
    }
}
