//! `bookacut-core` — shared primitives for the BookACut client.
//!
//! This crate is **pure**: identifiers, the tenant record, host classification
//! and the error model. No IO, no async.

pub mod error;
pub mod host;
pub mod id;
pub mod tenant;

pub use error::{DomainError, DomainResult};
pub use host::{DomainClass, Host, classify};
pub use id::{TenantId, UserId};
pub use tenant::TenantContext;
