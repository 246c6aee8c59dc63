//! `bookacut-client`
//!
//! **Responsibility:** the stateful side of the client core.
//!
//! This crate provides:
//! - Environment configuration
//! - The session holder over opaque key-value storage
//! - The REST client (bearer auth, 401 handling) and the auth service
//! - Tenant resolution for client domains
//! - `AppState`, the container tying these to the route tree
//!
//! The backend remains the authority; nothing here decides business rules.

pub mod api;
pub mod app;
pub mod auth_service;
pub mod config;
pub mod directory;
pub mod session_store;
pub mod storage;
pub mod tenant_resolver;

pub use api::{ApiClient, ApiError};
pub use app::{AppState, HeaderInfo};
pub use auth_service::{AuthError, AuthService, LoginRequest, RegisterRequest};
pub use config::{ClientConfig, ConfigError};
pub use directory::{HttpTenantDirectory, TenantDirectory};
pub use session_store::SessionStore;
pub use storage::{FileStore, InMemoryStore, KeyValueStore, StorageError};
pub use tenant_resolver::{ResolutionError, ResolutionState, ResolveOutcome, TenantResolver};
