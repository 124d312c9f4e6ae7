//! Role-gated access control for VaultKey.
//!
//! - [`user`]: `User` and the `Role` predicate
//! - [`registry`]: the in-memory `UserRegistry`
//! - [`audit`]: the append-only `AuditLog` and its `AuditFeed` cursor
//! - [`controller`]: `AccessController`, which ties them to a session
//!
//! State is process-lifetime only. Mutating calls take `&mut self`; callers
//! that share a controller across threads must wrap it in a mutex.

pub mod audit;
pub mod controller;
pub mod registry;
pub mod user;

pub use audit::{AuditFeed, AuditLog, AuditRecord};
pub use controller::{
    AccessController, AccessControllerBuilder, AccessResult, AuthResult, ProvisionResult, Session,
    DEFAULT_ADMIN, DEFAULT_RESOURCE,
};
pub use registry::UserRegistry;
pub use user::{Role, User};
