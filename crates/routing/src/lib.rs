//! `bookacut-routing` — the data-driven route table and the route tree.
//!
//! The table lists every reachable path per domain class; the tree evaluates a
//! navigation against it using the access guard from `bookacut-auth`. Pages are
//! named by [`Page`]; rendering them is up to the embedding front-end.

pub mod nav;
pub mod route;
pub mod table;
pub mod tree;

pub use nav::{NavItem, is_active, menu_for};
pub use route::{Access, DomainScope, Page, PathPattern, RouteDescriptor, RouteParams, normalize_path};
pub use table::{LOGIN_PATH, PathAlias, REGISTER_PATH, RouteTable, SubTree};
pub use tree::{
    NavigationRequest, Redirect, RedirectReason, RenderedRoute, RouteOutcome, RouteTree, TenantPhase,
    landing_path,
};
