use serde::Serialize;

use bookacut_core::DomainClass;

use crate::{Role, RoleSet, SessionIdentity};

/// Fallback target when a route does not name its own redirect.
pub const DEFAULT_REDIRECT: &str = "/";

/// Outcome of the access guard for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    RedirectLogin,
    RedirectTo(String),
}

/// Which guard rule produced a decision (checked in this order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRule {
    Anonymous,
    PlatformIdentityOnClientDomain,
    ClientIdentityOnPlatformDomain,
    RoleNotAllowed,
    Allowed,
}

fn evaluate(identity: Option<&SessionIdentity>, domain: DomainClass, allowed: &RoleSet) -> GuardRule {
    let Some(identity) = identity else {
        return GuardRule::Anonymous;
    };

    // A credential is scoped to one domain class before roles are considered.
    match (identity.role.domain_class(), domain) {
        (DomainClass::Platform, DomainClass::Client) => GuardRule::PlatformIdentityOnClientDomain,
        (DomainClass::Client, DomainClass::Platform) => GuardRule::ClientIdentityOnPlatformDomain,
        _ if !allowed.contains(identity.role) => GuardRule::RoleNotAllowed,
        _ => GuardRule::Allowed,
    }
}

/// Decide whether `identity` may see a route allowing `allowed` on `domain`.
///
/// - No IO
/// - No panics
/// - No navigation (the caller acts on the decision)
pub fn authorize(
    identity: Option<&SessionIdentity>,
    domain: DomainClass,
    allowed: &RoleSet,
    redirect_to: Option<&str>,
) -> Decision {
    match evaluate(identity, domain, allowed) {
        GuardRule::Anonymous
        | GuardRule::PlatformIdentityOnClientDomain
        | GuardRule::ClientIdentityOnPlatformDomain => Decision::RedirectLogin,
        GuardRule::RoleNotAllowed => {
            Decision::RedirectTo(redirect_to.unwrap_or(DEFAULT_REDIRECT).to_string())
        }
        GuardRule::Allowed => Decision::Allow,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision explanation (debug logging)
// ─────────────────────────────────────────────────────────────────────────────

/// Why the guard decided what it did.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    pub decision: Decision,
    pub rule: GuardRule,
    pub role: Option<Role>,
    pub domain: DomainClass,
    pub allowed_roles: Vec<Role>,
    pub reason: String,
}

/// Same decision as [`authorize`], with the rule that fired and a readable reason.
pub fn explain(
    identity: Option<&SessionIdentity>,
    domain: DomainClass,
    allowed: &RoleSet,
    redirect_to: Option<&str>,
) -> AccessExplanation {
    let rule = evaluate(identity, domain, allowed);
    let role = identity.map(|i| i.role);

    let reason = match (rule, role) {
        (GuardRule::Anonymous, _) => "no session; sign-in required".to_string(),
        (GuardRule::PlatformIdentityOnClientDomain, Some(role)) => {
            format!("platform role '{role}' is not honored on a client domain")
        }
        (GuardRule::ClientIdentityOnPlatformDomain, Some(role)) => {
            format!("client role '{role}' is not honored on the platform domain")
        }
        (GuardRule::RoleNotAllowed, Some(role)) => {
            format!("role '{role}' is not among the route's allowed roles {allowed:?}")
        }
        (GuardRule::Allowed, Some(role)) => format!("role '{role}' is allowed"),
        (_, None) => "no session".to_string(),
    };

    AccessExplanation {
        decision: authorize(identity, domain, allowed, redirect_to),
        rule,
        role,
        domain,
        allowed_roles: allowed.to_vec(),
        reason,
    }
}
