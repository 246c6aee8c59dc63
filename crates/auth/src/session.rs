use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookacut_core::{TenantId, UserId};

use crate::Role;

/// Who is signed in, as returned by the auth endpoints.
///
/// Wire shape: `{ "role", "name", "tenantId"?, "id"?, "email"? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub role: Role,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    #[serde(default, rename = "id", alias = "_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionIdentity {
    pub fn new(role: Role, name: impl Into<String>) -> Self {
        Self {
            role,
            name: name.into(),
            tenant_id: None,
            user_id: None,
            email: None,
        }
    }

    /// Apply a profile update. Fields left as `None` are kept.
    pub fn apply(&mut self, patch: IdentityPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(tenant_id) = patch.tenant_id {
            self.tenant_id = Some(tenant_id);
        }
    }
}

/// Partial profile update merged into the current identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
}

/// Opaque bearer credential.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header and persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// An authenticated session: identity and credential always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: SessionIdentity,
    credential: Credential,
    established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: SessionIdentity, credential: Credential, established_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            credential,
            established_at,
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut SessionIdentity {
        &mut self.identity
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// When this session was created or rehydrated in this process.
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}
