//! Tenant record resolved from a client domain.

use serde::{Deserialize, Serialize};

use crate::id::TenantId;

/// Identifying context of the salon whose domain is being served.
///
/// Wire shape: `{ "id", "name", "domain", "databaseName", ... }`; unknown
/// fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    #[serde(alias = "_id")]
    pub id: TenantId,

    pub name: String,

    #[serde(default)]
    pub domain: Option<String>,

    /// Backend handle of the tenant's isolated store. Opaque to the client.
    #[serde(default)]
    pub database_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_shape() {
        let tenant: TenantContext = serde_json::from_value(serde_json::json!({
            "_id": "65f1",
            "name": "ABC Salon",
            "domain": "abcsalon.com",
            "databaseName": "tenant_abc",
            "subscriptionStatus": "active"
        }))
        .unwrap();

        assert_eq!(tenant.id.as_str(), "65f1");
        assert_eq!(tenant.name, "ABC Salon");
        assert_eq!(tenant.domain.as_deref(), Some("abcsalon.com"));
        assert_eq!(tenant.database_name.as_deref(), Some("tenant_abc"));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let tenant: TenantContext =
            serde_json::from_value(serde_json::json!({ "id": "t1", "name": "Fade Lab" })).unwrap();
        assert!(tenant.domain.is_none());
        assert!(tenant.database_name.is_none());
    }
}
