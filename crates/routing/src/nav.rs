//! Sidebar navigation per role.

use serde::Serialize;

use bookacut_auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
}

const fn item(path: &'static str, label: &'static str) -> NavItem {
    NavItem { path, label }
}

const PLATFORM_MENU: &[NavItem] = &[
    item("/super-admin/dashboard", "Dashboard"),
    item("/super-admin/tenants", "Tenants"),
];

const CLIENT_ADMIN_MENU: &[NavItem] = &[
    item("/admin/dashboard", "Dashboard"),
    item("/admin/shops", "Shops"),
    item("/admin/invoices", "Invoices"),
];

const STAFF_MENU: &[NavItem] = &[
    item("/staff/dashboard", "Dashboard"),
    item("/staff/bookings", "Bookings"),
    item("/staff/walkin", "Walk-in Booking"),
    item("/staff/invoices", "Invoices"),
];

const CUSTOMER_MENU: &[NavItem] = &[
    item("/customer/services", "Services"),
    item("/customer/bookings", "My Bookings"),
];

pub fn menu_for(role: Role) -> &'static [NavItem] {
    match role {
        Role::PlatformSuperAdmin | Role::SuperAdmin => PLATFORM_MENU,
        Role::ClientAdmin => CLIENT_ADMIN_MENU,
        Role::Staff => STAFF_MENU,
        Role::Customer => CUSTOMER_MENU,
    }
}

/// Highlight rule: exact match, or the current path is below the item.
pub fn is_active(item_path: &str, current_path: &str) -> bool {
    match current_path.strip_prefix(item_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
