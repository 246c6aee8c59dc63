//! Route descriptors and path patterns.

use std::borrow::Cow;

use serde::Serialize;

use bookacut_auth::RoleSet;
use bookacut_core::DomainClass;

/// Screen a route renders. The embedding front-end maps each to a component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Login,
    Register,

    SuperAdminDashboard,
    TenantList,
    TenantDetails,
    RecordPayment,

    ClientAdminDashboard,
    ShopList,
    ShopDetails,
    StaffManagement,
    ServiceManagement,
    SlotManagement,
    ShopSettings,
    InvoiceList,

    StaffDashboard,
    StaffBookings,
    WalkInBooking,
    StaffInvoices,

    ServiceListing,
    BookSlot,
    BookingHistory,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Sign in",
            Page::Register => "Create account",
            Page::SuperAdminDashboard | Page::ClientAdminDashboard | Page::StaffDashboard => "Dashboard",
            Page::TenantList => "Tenants",
            Page::TenantDetails => "Tenant details",
            Page::RecordPayment => "Record payment",
            Page::ShopList => "Shops",
            Page::ShopDetails => "Shop details",
            Page::StaffManagement => "Staff",
            Page::ServiceManagement => "Services",
            Page::SlotManagement => "Slots",
            Page::ShopSettings => "Shop settings",
            Page::InvoiceList | Page::StaffInvoices => "Invoices",
            Page::StaffBookings => "Bookings",
            Page::WalkInBooking => "Walk-in booking",
            Page::ServiceListing => "Services",
            Page::BookSlot => "Book a slot",
            Page::BookingHistory => "My bookings",
        }
    }
}

/// Which domain classes a route may exist on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainScope {
    Platform,
    Client,
    Either,
}

impl DomainScope {
    pub fn admits(&self, domain: DomainClass) -> bool {
        match self {
            DomainScope::Either => true,
            DomainScope::Platform => domain == DomainClass::Platform,
            DomainScope::Client => domain == DomainClass::Client,
        }
    }
}

/// Who may see a route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a session (sign-in pages).
    Public,
    /// Guarded: only the listed roles.
    Roles(RoleSet),
}

/// A path pattern such as `/admin/shops/:id/staff`.
///
/// Segments starting with `:` capture one non-empty path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern(Cow<'static, str>);

impl PathPattern {
    pub fn new(pattern: impl Into<Cow<'static, str>>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Whether the pattern is absolute, has named params and no duplicates.
    pub fn is_valid(&self) -> bool {
        if !self.0.starts_with('/') {
            return false;
        }
        let mut names: Vec<&str> = Vec::new();
        for segment in self.segments() {
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() || names.contains(&name) {
                    return false;
                }
                names.push(name);
            }
        }
        true
    }

    /// Match an already-normalized path, capturing params.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut params = RouteParams::default();
        let mut path_segments = path.split('/').filter(|s| !s.is_empty());

        for pattern_segment in self.segments() {
            let segment = path_segments.next()?;
            match pattern_segment.strip_prefix(':') {
                Some(name) => params.push(name, segment),
                None if pattern_segment == segment => {}
                None => return None,
            }
        }

        match path_segments.next() {
            Some(_) => None,
            None => Some(params),
        }
    }
}

impl core::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values captured by `:name` segments, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub pattern: PathPattern,
    pub page: Page,
    pub access: Access,
    pub scope: DomainScope,
}

impl RouteDescriptor {
    pub fn public(pattern: impl Into<Cow<'static, str>>, page: Page, scope: DomainScope) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            page,
            access: Access::Public,
            scope,
        }
    }

    pub fn guarded(
        pattern: impl Into<Cow<'static, str>>,
        page: Page,
        roles: RoleSet,
        scope: DomainScope,
    ) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            page,
            access: Access::Roles(roles),
            scope,
        }
    }
}

/// Canonical form of an address-bar path.
///
/// Query and fragment are dropped, empty segments collapse, trailing slashes
/// are ignored and the empty path becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let segments: Vec<&str> = path[..end].split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_captures_params() {
        let pattern = PathPattern::new("/admin/shops/:id/staff");
        let params = pattern.matches("/admin/shops/42/staff").unwrap();
        assert_eq!(params.get("id"), Some("42"));

        assert!(pattern.matches("/admin/shops/42").is_none());
        assert!(pattern.matches("/admin/shops/42/staff/extra").is_none());
        assert!(pattern.matches("/admin/shop/42/staff").is_none());
    }

    #[test]
    fn literal_pattern_has_no_params() {
        let params = PathPattern::new("/staff/walkin").matches("/staff/walkin").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn pattern_validity() {
        assert!(PathPattern::new("/customer/book/:shopId").is_valid());
        assert!(!PathPattern::new("customer/book").is_valid());
        assert!(!PathPattern::new("/a/:/b").is_valid());
        assert!(!PathPattern::new("/a/:id/b/:id").is_valid());
    }

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/admin/dashboard/"), "/admin/dashboard");
        assert_eq!(normalize_path("//admin//shops/7?tab=staff#top"), "/admin/shops/7");
        assert_eq!(normalize_path("staff/bookings"), "/staff/bookings");
    }

    #[test]
    fn scope_admission() {
        assert!(DomainScope::Either.admits(DomainClass::Platform));
        assert!(DomainScope::Client.admits(DomainClass::Client));
        assert!(!DomainScope::Client.admits(DomainClass::Platform));
    }
}
