//! Route tree: evaluate one navigation against the table for a domain class.
//!
//! Transitions only happen through explicit navigation or the redirects this
//! module returns; it never navigates on its own.

use serde::Serialize;

use bookacut_auth::{Decision, SessionIdentity, explain};
use bookacut_core::{DomainClass, TenantContext};

use crate::route::{Page, RouteParams, normalize_path};
use crate::table::{LOGIN_PATH, RouteTable};

/// Tenant resolution as seen by the route tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "tenant", rename_all = "snake_case")]
pub enum TenantPhase {
    /// Platform domain: no tenant is ever resolved.
    NotRequired,
    /// Client domain, lookup not finished yet.
    Loading,
    /// Client domain, tenant known.
    Ready(TenantContext),
    /// Client domain, no tenant for this host (or the lookup gave up).
    NotFound,
}

/// One navigation to evaluate.
#[derive(Debug, Clone, Copy)]
pub struct NavigationRequest<'a> {
    pub path: &'a str,
    pub identity: Option<&'a SessionIdentity>,
    pub tenant: &'a TenantPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRoute {
    pub path: String,
    pub page: Page,
    /// Heading shown above the page.
    pub title: &'static str,
    pub params: RouteParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// Guard requires a (domain-appropriate) session.
    Login,
    /// Signed in, but the route is for another role.
    RoleMismatch,
    /// Sign-in pages bounce an active session to its landing path.
    AlreadyAuthenticated,
    /// Unknown path inside a role sub-tree.
    SubTreeFallback,
    /// Unknown top-level path.
    Unmatched,
    /// Old path prefix renamed.
    LegacyAlias,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub reason: RedirectReason,
}

/// What the front-end should mount for a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// Tenant resolution pending: show a placeholder, evaluate nothing.
    Loading,
    /// Full-screen "salon not found"; nothing beneath is reachable.
    TenantNotFound,
    Render(RenderedRoute),
    Redirect(Redirect),
}

impl RouteOutcome {
    fn redirect(to: impl Into<String>, reason: RedirectReason) -> Self {
        RouteOutcome::Redirect(Redirect {
            to: to.into(),
            reason,
        })
    }

    pub fn page(&self) -> Option<Page> {
        match self {
            RouteOutcome::Render(rendered) => Some(rendered.page),
            _ => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            RouteOutcome::Redirect(redirect) => Some(&redirect.to),
            _ => None,
        }
    }
}

/// Where `identity` lands on `domain`: its role's dashboard when the role
/// belongs to this domain class, otherwise the sign-in page.
pub fn landing_path(identity: Option<&SessionIdentity>, domain: DomainClass) -> &'static str {
    match identity {
        Some(identity) if identity.role.domain_class() == domain => identity.role.landing_path(),
        _ => LOGIN_PATH,
    }
}

/// The route tree for one domain class.
#[derive(Debug, Clone)]
pub struct RouteTree {
    table: RouteTable,
}

impl RouteTree {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn for_domain(domain: DomainClass) -> Self {
        Self::new(RouteTable::for_domain(domain))
    }

    pub fn domain(&self) -> DomainClass {
        self.table.domain()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn navigate(&self, request: &NavigationRequest<'_>) -> RouteOutcome {
        let domain = self.domain();

        // On client domains the guard only runs once the tenant is known.
        if domain == DomainClass::Client {
            match request.tenant {
                TenantPhase::Ready(_) => {}
                TenantPhase::NotFound => return RouteOutcome::TenantNotFound,
                TenantPhase::Loading | TenantPhase::NotRequired => return RouteOutcome::Loading,
            }
        }

        let path = normalize_path(request.path);

        if let Some(target) = self.table.aliases().iter().find_map(|alias| alias.rewrite(&path)) {
            tracing::debug!(from = %path, to = %target, "legacy path alias");
            return RouteOutcome::redirect(target, RedirectReason::LegacyAlias);
        }

        let landing = landing_path(request.identity, domain);

        if let Some((route, params)) = self.table.find_public(&path) {
            if landing != LOGIN_PATH {
                return RouteOutcome::redirect(landing, RedirectReason::AlreadyAuthenticated);
            }
            return RouteOutcome::Render(RenderedRoute {
                path,
                page: route.page,
                title: route.page.title(),
                params,
            });
        }

        let Some(subtree) = self.table.find_subtree(&path) else {
            return RouteOutcome::redirect(landing, RedirectReason::Unmatched);
        };

        let explanation = explain(request.identity, domain, &subtree.roles, Some(landing));
        tracing::debug!(
            path = %path,
            domain = %domain,
            rule = ?explanation.rule,
            reason = %explanation.reason,
            "access guard"
        );

        match explanation.decision {
            Decision::RedirectLogin => RouteOutcome::redirect(LOGIN_PATH, RedirectReason::Login),
            Decision::RedirectTo(to) => RouteOutcome::redirect(to, RedirectReason::RoleMismatch),
            Decision::Allow => match subtree.find(&path) {
                Some((route, params)) => RouteOutcome::Render(RenderedRoute {
                    path,
                    page: route.page,
                    title: route.page.title(),
                    params,
                }),
                None => RouteOutcome::redirect(subtree.default_path, RedirectReason::SubTreeFallback),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookacut_auth::Role;
    use bookacut_core::TenantId;
    use proptest::prelude::*;

    fn tenant() -> TenantPhase {
        TenantPhase::Ready(TenantContext {
            id: TenantId::new("t-1").unwrap(),
            name: "ABC Salon".to_string(),
            domain: Some("abcsalon.com".to_string()),
            database_name: None,
        })
    }

    fn who(role: Role) -> SessionIdentity {
        SessionIdentity::new(role, "Test User")
    }

    fn go(tree: &RouteTree, path: &str, identity: Option<&SessionIdentity>, tenant: &TenantPhase) -> RouteOutcome {
        tree.navigate(&NavigationRequest {
            path,
            identity,
            tenant,
        })
    }

    fn client(path: &str, identity: Option<&SessionIdentity>) -> RouteOutcome {
        go(&RouteTree::for_domain(DomainClass::Client), path, identity, &tenant())
    }

    fn platform(path: &str, identity: Option<&SessionIdentity>) -> RouteOutcome {
        go(&RouteTree::for_domain(DomainClass::Platform), path, identity, &TenantPhase::NotRequired)
    }

    #[test]
    fn anonymous_on_admin_dashboard_goes_to_login() {
        let outcome = client("/admin/dashboard", None);
        assert_eq!(outcome.redirect_target(), Some("/login"));
    }

    #[test]
    fn client_admin_reaches_shop_staff() {
        let admin = who(Role::ClientAdmin);
        let outcome = client("/admin/shops/42/staff", Some(&admin));

        let RouteOutcome::Render(rendered) = outcome else {
            panic!("expected render, got {outcome:?}");
        };
        assert_eq!(rendered.page, Page::StaffManagement);
        assert_eq!(rendered.title, "Staff");
        assert_eq!(rendered.params.get("id"), Some("42"));
    }

    #[test]
    fn client_admin_on_staff_dashboard_goes_to_own_dashboard() {
        let admin = who(Role::ClientAdmin);
        assert_eq!(
            client("/staff/dashboard", Some(&admin)),
            RouteOutcome::Redirect(Redirect {
                to: "/admin/dashboard".to_string(),
                reason: RedirectReason::RoleMismatch,
            })
        );
    }

    #[test]
    fn loading_and_not_found_gate_the_client_tree() {
        let tree = RouteTree::for_domain(DomainClass::Client);
        let admin = who(Role::ClientAdmin);

        assert_eq!(go(&tree, "/admin/dashboard", Some(&admin), &TenantPhase::Loading), RouteOutcome::Loading);
        assert_eq!(go(&tree, "/login", None, &TenantPhase::Loading), RouteOutcome::Loading);
        assert_eq!(
            go(&tree, "/admin/dashboard", Some(&admin), &TenantPhase::NotFound),
            RouteOutcome::TenantNotFound
        );
        assert_eq!(go(&tree, "/login", None, &TenantPhase::NotFound), RouteOutcome::TenantNotFound);
    }

    #[test]
    fn platform_identity_is_not_honored_on_client_domain() {
        let operator = who(Role::PlatformSuperAdmin);
        assert_eq!(client("/admin/dashboard", Some(&operator)).redirect_target(), Some("/login"));
        // The sign-in page renders for them instead of bouncing back.
        assert_eq!(client("/login", Some(&operator)).page(), Some(Page::Login));
        assert_eq!(client("/", Some(&operator)).redirect_target(), Some("/login"));
    }

    #[test]
    fn client_identity_is_not_honored_on_platform_domain() {
        let staff = who(Role::Staff);
        assert_eq!(platform("/super-admin/tenants", Some(&staff)).redirect_target(), Some("/login"));
        assert_eq!(platform("/login", Some(&staff)).page(), Some(Page::Login));
    }

    #[test]
    fn platform_tree_serves_super_admin() {
        let operator = who(Role::SuperAdmin);
        let outcome = platform("/super-admin/tenants/9/payment", Some(&operator));
        assert_eq!(outcome.page(), Some(Page::RecordPayment));

        assert_eq!(platform("/", Some(&operator)).redirect_target(), Some("/super-admin/dashboard"));
        assert_eq!(platform("/login", Some(&operator)).redirect_target(), Some("/super-admin/dashboard"));
    }

    #[test]
    fn client_paths_do_not_exist_on_platform() {
        let operator = who(Role::PlatformSuperAdmin);
        let outcome = platform("/admin/dashboard", Some(&operator));
        assert_eq!(
            outcome,
            RouteOutcome::Redirect(Redirect {
                to: "/super-admin/dashboard".to_string(),
                reason: RedirectReason::Unmatched,
            })
        );
        assert_eq!(platform("/register", None).redirect_target(), Some("/login"));
    }

    #[test]
    fn unknown_path_inside_subtree_falls_back_to_default() {
        let staff = who(Role::Staff);
        assert_eq!(
            client("/staff/nowhere", Some(&staff)),
            RouteOutcome::Redirect(Redirect {
                to: "/staff/dashboard".to_string(),
                reason: RedirectReason::SubTreeFallback,
            })
        );

        let customer = who(Role::Customer);
        assert_eq!(client("/customer", Some(&customer)).redirect_target(), Some("/customer/services"));
    }

    #[test]
    fn unknown_subtree_path_for_wrong_role_is_guarded_first() {
        let customer = who(Role::Customer);
        let outcome = client("/admin/nowhere", Some(&customer));
        assert_eq!(
            outcome,
            RouteOutcome::Redirect(Redirect {
                to: "/customer/services".to_string(),
                reason: RedirectReason::RoleMismatch,
            })
        );
    }

    #[test]
    fn top_level_unmatched_uses_landing_path() {
        assert_eq!(client("/", None).redirect_target(), Some("/login"));
        assert_eq!(client("/does/not/exist", None).redirect_target(), Some("/login"));

        let staff = who(Role::Staff);
        assert_eq!(client("/", Some(&staff)).redirect_target(), Some("/staff/dashboard"));
    }

    #[test]
    fn sign_in_pages_bounce_active_sessions() {
        let customer = who(Role::Customer);
        assert_eq!(
            client("/register", Some(&customer)),
            RouteOutcome::Redirect(Redirect {
                to: "/customer/services".to_string(),
                reason: RedirectReason::AlreadyAuthenticated,
            })
        );
        assert_eq!(client("/register", None).page(), Some(Page::Register));
    }

    #[test]
    fn legacy_admin_paths_are_aliased() {
        let admin = who(Role::ClientAdmin);
        assert_eq!(
            client("/client-admin/shops/5", Some(&admin)),
            RouteOutcome::Redirect(Redirect {
                to: "/admin/shops/5".to_string(),
                reason: RedirectReason::LegacyAlias,
            })
        );

        let tree = RouteTree::new(RouteTable::for_domain(DomainClass::Client).without_aliases());
        assert_eq!(
            go(&tree, "/client-admin/shops/5", Some(&admin), &tenant()).redirect_target(),
            Some("/admin/dashboard")
        );
    }

    #[test]
    fn query_and_trailing_slash_are_ignored() {
        let staff = who(Role::Staff);
        let outcome = client("/staff/bookings/?date=2026-10-16", Some(&staff));
        assert_eq!(outcome.page(), Some(Page::StaffBookings));
    }

    fn any_identity() -> impl Strategy<Value = Option<SessionIdentity>> {
        prop::option::of(prop::sample::select(Role::ALL.to_vec()).prop_map(who))
    }

    fn any_path() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("/".to_string()),
            prop::sample::select(vec![
                "/login", "/register", "/admin", "/staff", "/customer", "/super-admin", "/client-admin",
            ])
            .prop_flat_map(|prefix| {
                prop::collection::vec("[a-z0-9]{1,6}", 0..3)
                    .prop_map(move |rest| format!("{prefix}/{}", rest.join("/")))
            }),
        ]
    }

    proptest! {
        /// Following redirects always settles on a rendered page within a few hops.
        #[test]
        fn redirects_settle(path in any_path(), identity in any_identity(), on_platform in any::<bool>()) {
            let (tree, phase) = if on_platform {
                (RouteTree::for_domain(DomainClass::Platform), TenantPhase::NotRequired)
            } else {
                (RouteTree::for_domain(DomainClass::Client), tenant())
            };

            let mut current = path;
            let mut rendered = None;
            for _ in 0..4 {
                match go(&tree, &current, identity.as_ref(), &phase) {
                    RouteOutcome::Render(r) => {
                        rendered = Some(r);
                        break;
                    }
                    RouteOutcome::Redirect(r) => current = r.to,
                    other => prop_assert!(false, "unexpected {:?}", other),
                }
            }
            prop_assert!(rendered.is_some(), "no page reached from {}", current);
        }
    }
}
