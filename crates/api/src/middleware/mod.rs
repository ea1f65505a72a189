//! Request middleware: authentication and tenant-context propagation.

pub mod auth;
pub mod tenant;

pub use auth::{AuthUser, auth_middleware};
pub use tenant::{TenantScope, tenant_middleware};
