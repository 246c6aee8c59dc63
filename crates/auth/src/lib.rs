//! `bookacut-auth` — session identity and the route access guard.
//!
//! This crate is intentionally decoupled from HTTP, storage and routing: it
//! states *who* is signed in and *whether* they may see a route on the current
//! domain class. Performing the redirect is the caller's job.

pub mod authorize;
pub mod claims;
pub mod roles;
pub mod session;

pub use authorize::{AccessExplanation, Decision, GuardRule, authorize, explain};
pub use claims::{AuthPayload, AuthPayloadError};
pub use roles::{Role, RoleSet};
pub use session::{Credential, IdentityPatch, Session, SessionIdentity};
