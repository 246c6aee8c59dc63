//! The route table, partitioned by domain class.
//!
//! A table built for one domain class simply does not contain the other
//! class's paths: those are unreachable rather than access-denied.

use serde::Serialize;

use bookacut_auth::{Role, RoleSet};
use bookacut_core::DomainClass;

use crate::route::{DomainScope, Page, RouteDescriptor, RouteParams};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// A role-scoped group of routes sharing a prefix and a default page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTree {
    pub prefix: &'static str,
    pub roles: RoleSet,
    pub default_path: &'static str,
    pub scope: DomainScope,
    pub routes: Vec<RouteDescriptor>,
}

impl SubTree {
    fn new(
        prefix: &'static str,
        roles: RoleSet,
        default_path: &'static str,
        scope: DomainScope,
        pages: &[(&'static str, Page)],
    ) -> Self {
        let routes = pages
            .iter()
            .map(|&(suffix, page)| {
                RouteDescriptor::guarded(format!("{prefix}/{suffix}"), page, roles, scope)
            })
            .collect();

        Self {
            prefix,
            roles,
            default_path,
            scope,
            routes,
        }
    }

    /// Whether `path` (normalized) lies under this sub-tree's prefix.
    pub fn contains_path(&self, path: &str) -> bool {
        has_prefix(path, self.prefix)
    }

    pub fn find(&self, path: &str) -> Option<(&RouteDescriptor, RouteParams)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }
}

/// Backward-compatible prefix rename (e.g. old admin paths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathAlias {
    pub from_prefix: &'static str,
    pub to_prefix: &'static str,
}

impl PathAlias {
    pub fn rewrite(&self, path: &str) -> Option<String> {
        if !has_prefix(path, self.from_prefix) {
            return None;
        }
        Some(format!("{}{}", self.to_prefix, &path[self.from_prefix.len()..]))
    }
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Every route reachable on one domain class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    domain: DomainClass,
    public: Vec<RouteDescriptor>,
    subtrees: Vec<SubTree>,
    aliases: Vec<PathAlias>,
}

impl RouteTable {
    /// Build the table for `domain`, keeping only entries scoped to it.
    pub fn for_domain(domain: DomainClass) -> Self {
        let public = public_routes()
            .into_iter()
            .filter(|route| route.scope.admits(domain))
            .collect();

        let subtrees = role_subtrees()
            .into_iter()
            .filter(|subtree| subtree.scope.admits(domain))
            .collect();

        let aliases = match domain {
            DomainClass::Client => vec![PathAlias {
                from_prefix: "/client-admin",
                to_prefix: "/admin",
            }],
            DomainClass::Platform => Vec::new(),
        };

        Self {
            domain,
            public,
            subtrees,
            aliases,
        }
    }

    /// Drop the legacy path aliases.
    pub fn without_aliases(mut self) -> Self {
        self.aliases.clear();
        self
    }

    pub fn domain(&self) -> DomainClass {
        self.domain
    }

    pub fn public_routes(&self) -> &[RouteDescriptor] {
        &self.public
    }

    pub fn subtrees(&self) -> &[SubTree] {
        &self.subtrees
    }

    pub fn aliases(&self) -> &[PathAlias] {
        &self.aliases
    }

    /// All descriptors, public first.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.public
            .iter()
            .chain(self.subtrees.iter().flat_map(|subtree| subtree.routes.iter()))
    }

    pub fn find_public(&self, path: &str) -> Option<(&RouteDescriptor, RouteParams)> {
        self.public
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn find_subtree(&self, path: &str) -> Option<&SubTree> {
        self.subtrees.iter().find(|subtree| subtree.contains_path(path))
    }
}

fn public_routes() -> Vec<RouteDescriptor> {
    vec![
        RouteDescriptor::public(LOGIN_PATH, Page::Login, DomainScope::Either),
        RouteDescriptor::public(REGISTER_PATH, Page::Register, DomainScope::Client),
    ]
}

fn role_subtrees() -> Vec<SubTree> {
    vec![
        SubTree::new(
            "/super-admin",
            RoleSet::PLATFORM,
            Role::SuperAdmin.landing_path(),
            DomainScope::Platform,
            &[
                ("dashboard", Page::SuperAdminDashboard),
                ("tenants", Page::TenantList),
                ("tenants/:id", Page::TenantDetails),
                ("tenants/:id/payment", Page::RecordPayment),
            ],
        ),
        SubTree::new(
            "/admin",
            RoleSet::of(Role::ClientAdmin),
            Role::ClientAdmin.landing_path(),
            DomainScope::Client,
            &[
                ("dashboard", Page::ClientAdminDashboard),
                ("shops", Page::ShopList),
                ("shops/:id", Page::ShopDetails),
                ("shops/:id/staff", Page::StaffManagement),
                ("shops/:id/services", Page::ServiceManagement),
                ("shops/:id/slots", Page::SlotManagement),
                ("shops/:id/settings", Page::ShopSettings),
                ("invoices", Page::InvoiceList),
            ],
        ),
        SubTree::new(
            "/staff",
            RoleSet::of(Role::Staff),
            Role::Staff.landing_path(),
            DomainScope::Client,
            &[
                ("dashboard", Page::StaffDashboard),
                ("bookings", Page::StaffBookings),
                ("walkin", Page::WalkInBooking),
                ("invoices", Page::StaffInvoices),
            ],
        ),
        SubTree::new(
            "/customer",
            RoleSet::of(Role::Customer),
            Role::Customer.landing_path(),
            DomainScope::Client,
            &[
                ("services", Page::ServiceListing),
                ("book/:shopId", Page::BookSlot),
                ("bookings", Page::BookingHistory),
            ],
        ),
    ]
}
