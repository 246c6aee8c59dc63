use core::str::FromStr;

use serde::{Deserialize, Serialize};

use bookacut_core::{DomainClass, DomainError};

/// Role of a signed-in user.
///
/// Each role belongs to exactly one domain class: platform roles are only
/// honored on the platform domain, client roles only on salon domains.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PlatformSuperAdmin,
    /// Legacy name for the platform operator; treated like `PlatformSuperAdmin`.
    SuperAdmin,
    ClientAdmin,
    Staff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::PlatformSuperAdmin,
        Role::SuperAdmin,
        Role::ClientAdmin,
        Role::Staff,
        Role::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformSuperAdmin => "platform_super_admin",
            Role::SuperAdmin => "super_admin",
            Role::ClientAdmin => "client_admin",
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }

    /// Human-readable name for headers and menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::PlatformSuperAdmin | Role::SuperAdmin => "Super Admin",
            Role::ClientAdmin => "Client Admin",
            Role::Staff => "Staff",
            Role::Customer => "Customer",
        }
    }

    /// The only domain class on which this role's session is honored.
    pub fn domain_class(&self) -> DomainClass {
        if RoleSet::PLATFORM.contains(*self) {
            DomainClass::Platform
        } else {
            DomainClass::Client
        }
    }

    pub fn is_platform(&self) -> bool {
        self.domain_class().is_platform()
    }

    /// Where a signed-in user of this role lands by default.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::PlatformSuperAdmin | Role::SuperAdmin => "/super-admin/dashboard",
            Role::ClientAdmin => "/admin/dashboard",
            Role::Staff => "/staff/dashboard",
            Role::Customer => "/customer/services",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::unknown_role(s))
    }
}

/// A small, copyable set of roles (used for a route's allowed roles).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    /// Roles scoped to the platform domain.
    pub const PLATFORM: RoleSet = RoleSet::EMPTY
        .with(Role::PlatformSuperAdmin)
        .with(Role::SuperAdmin);

    /// Roles scoped to client (salon) domains.
    pub const CLIENT: RoleSet = RoleSet::EMPTY
        .with(Role::ClientAdmin)
        .with(Role::Staff)
        .with(Role::Customer);

    pub const fn of(role: Role) -> Self {
        RoleSet::EMPTY.with(role)
    }

    pub const fn with(self, role: Role) -> Self {
        RoleSet(self.0 | bit(role))
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & bit(role) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }

    pub fn to_vec(&self) -> Vec<Role> {
        self.iter().collect()
    }
}

const fn bit(role: Role) -> u8 {
    1 << (role as u8)
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::EMPTY, RoleSet::with)
    }
}

impl core::fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for RoleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
