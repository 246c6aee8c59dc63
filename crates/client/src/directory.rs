//! Host → tenant lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use bookacut_core::{Host, TenantContext};

use crate::api::{ApiClient, ApiError};
use crate::tenant_resolver::ResolutionError;

pub const RESOLVE_DOMAIN_PATH: &str = "/public/tenants/resolve-domain";

/// Source of tenant records by host. One call = one network lookup.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn lookup(&self, host: &Host) -> Result<TenantContext, ResolutionError>;
}

#[derive(Debug, Deserialize)]
struct ResolveDomainResponse {
    #[serde(default)]
    tenant: Option<TenantContext>,
}

/// `GET /public/tenants/resolve-domain?host=<host>` on the configured API.
#[derive(Debug, Clone)]
pub struct HttpTenantDirectory {
    api: Arc<ApiClient>,
}

impl HttpTenantDirectory {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TenantDirectory for HttpTenantDirectory {
    async fn lookup(&self, host: &Host) -> Result<TenantContext, ResolutionError> {
        let response: ResolveDomainResponse = self
            .api
            .get_json(RESOLVE_DOMAIN_PATH, &[("host", host.as_str())])
            .await
            .map_err(classify_error)?;

        response.tenant.ok_or(ResolutionError::NotFound)
    }
}

/// The backend answered definitively unless the failure is transient.
fn classify_error(err: ApiError) -> ResolutionError {
    if err.is_transient() {
        ResolutionError::Transient(err.to_string())
    } else {
        ResolutionError::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_resolution_errors() {
        assert_eq!(
            classify_error(ApiError::Api { status: 404, message: "no tenant".into() }),
            ResolutionError::NotFound
        );
        assert_eq!(classify_error(ApiError::Decode("eof".into())), ResolutionError::NotFound);
        assert!(matches!(
            classify_error(ApiError::Network("refused".into())),
            ResolutionError::Transient(_)
        ));
        assert!(matches!(
            classify_error(ApiError::Api { status: 502, message: "down".into() }),
            ResolutionError::Transient(_)
        ));
    }
}
