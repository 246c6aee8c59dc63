//! Application state: one per running client, built at boot and shared.
//!
//! Ties together the host classification, session holder, tenant resolver
//! and route tree. Page components read from here; only the auth service
//! and the resolver write.

use std::sync::Arc;

use serde::Serialize;

use bookacut_core::{DomainClass, Host, TenantContext};
use bookacut_routing::{NavItem, NavigationRequest, RouteOutcome, RouteTable, RouteTree, menu_for};

use crate::api::{ApiClient, ApiError};
use crate::auth_service::{AuthError, AuthService};
use crate::config::ClientConfig;
use crate::directory::{HttpTenantDirectory, TenantDirectory};
use crate::session_store::SessionStore;
use crate::storage::KeyValueStore;
use crate::tenant_resolver::{ResolutionError, ResolveOutcome, TenantResolver};

/// Who is signed in, as shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    pub name: String,
    pub role: &'static str,
}

#[derive(Debug)]
pub struct AppState {
    config: ClientConfig,
    host: Host,
    domain: DomainClass,
    session: Arc<SessionStore>,
    api: Arc<ApiClient>,
    auth: AuthService,
    resolver: TenantResolver,
    tree: RouteTree,
}

impl AppState {
    /// Boot against the configured backend.
    pub fn boot(config: ClientConfig, host: Host, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let session = Arc::new(SessionStore::hydrate(storage));
        let api = Arc::new(ApiClient::new(&config, session.clone())?);
        let directory = Arc::new(HttpTenantDirectory::new(api.clone()));
        Ok(Self::assemble(config, host, session, api, directory))
    }

    /// Boot with a caller-supplied tenant directory.
    pub fn boot_with_directory(
        config: ClientConfig,
        host: Host,
        storage: Arc<dyn KeyValueStore>,
        directory: Arc<dyn TenantDirectory>,
    ) -> Result<Self, ApiError> {
        let session = Arc::new(SessionStore::hydrate(storage));
        let api = Arc::new(ApiClient::new(&config, session.clone())?);
        Ok(Self::assemble(config, host, session, api, directory))
    }

    fn assemble(
        config: ClientConfig,
        host: Host,
        session: Arc<SessionStore>,
        api: Arc<ApiClient>,
        directory: Arc<dyn TenantDirectory>,
    ) -> Self {
        let domain = host.classify(&config.platform_domain);
        let table = RouteTable::for_domain(domain);
        let table = if config.legacy_aliases { table } else { table.without_aliases() };
        let resolver = TenantResolver::new(config.platform_domain.clone(), directory);

        tracing::info!(%host, %domain, api = %api.base_url(), "client booted");

        Self {
            auth: AuthService::new(api.clone()),
            config,
            host,
            domain,
            session,
            api,
            resolver,
            tree: RouteTree::new(table),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn domain(&self) -> DomainClass {
        self.domain
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    /// Resolve the tenant for the serving host (no-op on the platform domain).
    pub async fn ensure_tenant(&self) -> Result<ResolveOutcome, ResolutionError> {
        self.resolver.resolve(&self.host).await
    }

    pub fn tenant(&self) -> Option<TenantContext> {
        self.resolver.tenant()
    }

    /// Evaluate a navigation with the current session and tenant phase.
    pub fn navigate(&self, path: &str) -> RouteOutcome {
        let identity = self.session.identity();
        let tenant = self.resolver.phase(&self.host);
        self.tree.navigate(&NavigationRequest {
            path,
            identity: identity.as_ref(),
            tenant: &tenant,
        })
    }

    /// Sidebar entries for the signed-in role, empty when signed out.
    pub fn menu(&self) -> &'static [NavItem] {
        match self.session.identity() {
            Some(identity) => menu_for(identity.role),
            None => &[],
        }
    }

    pub fn header(&self) -> Option<HeaderInfo> {
        self.session.identity().map(|identity| HeaderInfo {
            role: identity.role.display_name(),
            name: identity.name,
        })
    }

    pub fn logout(&self) -> Result<&'static str, AuthError> {
        self.auth.logout()
    }
}
